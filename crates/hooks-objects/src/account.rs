use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::errors::AddressError;

// CONSTANTS
// ================================================================================================

/// The base58 alphabet used for ledger addresses
/// (`rpshnaf39wBUDNEGHJKLM4PQRST7VWXYZ2bcdeCg65jkm8oFqi1tuvAxyz`).
const ADDRESS_ALPHABET: &bs58::Alphabet = bs58::Alphabet::RIPPLE;

/// Version byte prefixed to an account id before base58 encoding.
const ACCOUNT_ID_PREFIX: u8 = 0x00;

// ACCOUNT ID
// ================================================================================================

/// A 20-byte ledger account identifier.
///
/// The user-facing rendition is a base58-check address using the ledger alphabet, a `0x00` type
/// prefix and a 4-byte double-SHA-256 checksum. [`AccountId::to_address`] and
/// [`AccountId::from_address`] are exact inverses of each other.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AccountId([u8; 20]);

impl AccountId {
    /// The number of bytes in an account id.
    pub const SIZE: usize = 20;

    /// Returns a new [AccountId] wrapping the provided bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Parses an account id from a byte slice; the slice must be exactly 20 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let bytes: [u8; 20] =
            bytes.try_into().map_err(|_| AddressError::InvalidIdLength(bytes.len()))?;
        Ok(Self(bytes))
    }

    /// Returns the underlying bytes.
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Derives the account id owned by a signing public key: RIPEMD-160 over SHA-256 of the
    /// key bytes.
    pub fn from_public_key(public_key: &[u8]) -> Self {
        let sha = Sha256::digest(public_key);
        let digest = Ripemd160::digest(sha);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Encodes this account id as a base58-check address string.
    pub fn to_address(&self) -> String {
        let mut payload = [0u8; 21];
        payload[0] = ACCOUNT_ID_PREFIX;
        payload[1..].copy_from_slice(&self.0);

        let check = checksum(&payload);
        let mut full = Vec::with_capacity(25);
        full.extend_from_slice(&payload);
        full.extend_from_slice(&check);

        bs58::encode(full).with_alphabet(ADDRESS_ALPHABET).into_string()
    }

    /// Decodes a base58-check address string into an account id.
    ///
    /// # Errors
    /// Returns an error if:
    /// - the string contains characters outside the address alphabet;
    /// - the decoded payload is not prefix + 20 bytes + 4-byte checksum;
    /// - the checksum does not match.
    pub fn from_address(address: &str) -> Result<Self, AddressError> {
        let decoded: Vec<u8> = bs58::decode(address)
            .with_alphabet(ADDRESS_ALPHABET)
            .into_vec()
            .map_err(|_| AddressError::InvalidCharacter)?;

        if decoded.len() != 25 {
            return Err(AddressError::InvalidAddressLength(decoded.len()));
        }
        if decoded[0] != ACCOUNT_ID_PREFIX {
            return Err(AddressError::InvalidPrefix(decoded[0]));
        }

        let (payload, check) = decoded.split_at(21);
        if checksum(payload) != check {
            return Err(AddressError::ChecksumMismatch);
        }

        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&payload[1..]);
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for AccountId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 20]> for AccountId {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_address())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.to_address())
    }
}

// HELPERS
// ================================================================================================

/// First four bytes of double SHA-256 over `data`.
fn checksum(data: &[u8]) -> [u8; 4] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 4];
    out.copy_from_slice(&second[..4]);
    out
}

// TESTS
// ================================================================================================

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::AccountId;
    use crate::errors::AddressError;

    #[test]
    fn address_round_trip() {
        for fill in [0x00u8, 0x01, 0x7f, 0xff] {
            let id = AccountId::new([fill; 20]);
            let address = id.to_address();
            assert!(address.starts_with('r'), "address {address} must carry the account prefix");
            assert_eq!(AccountId::from_address(&address).unwrap(), id);
        }
    }

    #[test]
    fn zero_account_is_the_known_address() {
        // The all-zero account id has a fixed, well-known rendition.
        let id = AccountId::new([0; 20]);
        assert_eq!(id.to_address(), "rrrrrrrrrrrrrrrrrrrrrhoLvTp");
    }

    #[test]
    fn corrupted_checksum_is_rejected() {
        let mut address = AccountId::new([3; 20]).to_address();
        // Flip the final character to another alphabet character.
        let last = address.pop().unwrap();
        address.push(if last == 'r' { 'p' } else { 'r' });
        assert_matches!(
            AccountId::from_address(&address),
            Err(AddressError::ChecksumMismatch | AddressError::InvalidAddressLength(_))
        );
    }

    #[test]
    fn invalid_characters_are_rejected() {
        // '0', 'O', 'I' and 'l' are not part of the alphabet.
        assert_matches!(
            AccountId::from_address("r0OIl"),
            Err(AddressError::InvalidCharacter)
        );
    }

    #[test]
    fn wrong_payload_length_is_rejected() {
        assert_matches!(AccountId::from_slice(&[0; 19]), Err(AddressError::InvalidIdLength(19)));
    }

    #[test]
    fn public_key_derivation_is_stable() {
        let key = [0x02; 33];
        let id = AccountId::from_public_key(&key);
        assert_eq!(id, AccountId::from_public_key(&key));
        assert_ne!(id, AccountId::from_public_key(&[0x03; 33]));
        // The derived id round-trips through its address like any other.
        assert_eq!(AccountId::from_address(&id.to_address()).unwrap(), id);
    }
}
