use crate::account::AccountId;
use crate::hash::{sha512h_parts, Hash256};

// KEYLET SPACE
// ================================================================================================

/// The namespace a ledger object key was derived in.
///
/// The space tag is mixed into the key derivation so that objects of different kinds can never
/// collide, and it travels with the key so lookups can be type-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum KeyletSpace {
    /// An account root object.
    Account = 0x0061,
    /// The directory listing an account's owned objects.
    OwnerDir = 0x004f,
    /// The hook object attached to an account.
    Hook = 0x0048,
    /// A single hook state entry.
    HookState = 0x0076,
    /// A key supplied by the guest verbatim, with no namespace.
    Generic = 0x0000,
}

impl KeyletSpace {
    /// Parses a space from its wire tag.
    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            0x0061 => Some(Self::Account),
            0x004f => Some(Self::OwnerDir),
            0x0048 => Some(Self::Hook),
            0x0076 => Some(Self::HookState),
            0x0000 => Some(Self::Generic),
            _ => None,
        }
    }
}

// KEYLET
// ================================================================================================

/// A typed key identifying a ledger object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Keylet {
    pub space: KeyletSpace,
    pub key: Hash256,
}

impl Keylet {
    /// The serialized size: 2-byte space tag followed by the 32-byte key.
    pub const SIZE: usize = 34;

    /// Returns the keylet of an account's root object.
    pub fn account(account: AccountId) -> Self {
        Self::derived(KeyletSpace::Account, &[account.as_ref()])
    }

    /// Returns the keylet of an account's owner directory.
    pub fn owner_dir(account: AccountId) -> Self {
        Self::derived(KeyletSpace::OwnerDir, &[account.as_ref()])
    }

    /// Returns the keylet of the hook object attached to an account.
    pub fn hook(account: AccountId) -> Self {
        Self::derived(KeyletSpace::Hook, &[account.as_ref()])
    }

    /// Returns the keylet of one hook state entry, addressed by owning account and state key.
    pub fn hook_state(owner: AccountId, state_key: Hash256) -> Self {
        Self::derived(KeyletSpace::HookState, &[owner.as_ref(), state_key.as_ref()])
    }

    /// Returns a keylet wrapping a raw 256-bit object key with no namespace derivation.
    pub fn generic(key: Hash256) -> Self {
        Self { space: KeyletSpace::Generic, key }
    }

    /// Serializes this keylet into its 34-byte wire form.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[..2].copy_from_slice(&(self.space as u16).to_be_bytes());
        out[2..].copy_from_slice(self.key.as_ref());
        out
    }

    /// Parses a keylet from its 34-byte wire form.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::SIZE {
            return None;
        }
        let tag = u16::from_be_bytes([bytes[0], bytes[1]]);
        let space = KeyletSpace::from_tag(tag)?;
        let key = Hash256::from_slice(&bytes[2..])?;
        Some(Self { space, key })
    }

    fn derived(space: KeyletSpace, parts: &[&[u8]]) -> Self {
        let tag = (space as u16).to_be_bytes();
        let mut all: alloc::vec::Vec<&[u8]> = alloc::vec::Vec::with_capacity(parts.len() + 1);
        all.push(&tag);
        all.extend_from_slice(parts);
        Self { space, key: sha512h_parts(&all) }
    }
}

// TESTS
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::{Keylet, KeyletSpace};
    use crate::account::AccountId;
    use crate::hash::Hash256;

    #[test]
    fn wire_round_trip() {
        let account = AccountId::new([9; 20]);
        for keylet in [
            Keylet::account(account),
            Keylet::owner_dir(account),
            Keylet::hook(account),
            Keylet::hook_state(account, Hash256::new([1; 32])),
            Keylet::generic(Hash256::new([2; 32])),
        ] {
            assert_eq!(Keylet::from_bytes(&keylet.to_bytes()), Some(keylet));
        }
    }

    #[test]
    fn spaces_never_collide() {
        let account = AccountId::new([9; 20]);
        assert_ne!(Keylet::account(account).key, Keylet::owner_dir(account).key);
        assert_ne!(Keylet::account(account).key, Keylet::hook(account).key);
    }

    #[test]
    fn state_keylets_bind_owner_and_key() {
        let key = Hash256::new([5; 32]);
        let a = Keylet::hook_state(AccountId::new([1; 20]), key);
        let b = Keylet::hook_state(AccountId::new([2; 20]), key);
        assert_ne!(a.key, b.key);
    }

    #[test]
    fn unknown_space_tag_is_rejected() {
        let mut bytes = Keylet::generic(Hash256::new([3; 32])).to_bytes();
        bytes[0] = 0xff;
        assert_eq!(Keylet::from_bytes(&bytes), None);
        assert_eq!(KeyletSpace::from_tag(0xffff), None);
    }
}
