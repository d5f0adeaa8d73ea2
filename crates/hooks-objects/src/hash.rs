use core::fmt;

use sha2::{Digest, Sha512};

// HASH256
// ================================================================================================

/// A 256-bit ledger hash.
///
/// Used for ledger object keys, transaction ids, hook namespaces, hook state keys and derived
/// nonces. The canonical text rendition is upper-case hex.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    /// The number of bytes in the hash.
    pub const SIZE: usize = 32;

    /// The all-zero hash.
    pub const ZERO: Self = Self([0; 32]);

    /// Returns a new [Hash256] wrapping the provided bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parses a hash from a byte slice; the slice must be exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Parses a hash from its hex rendition (case-insensitive, 64 digits).
    pub fn from_hex(s: &str) -> Option<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).ok()?;
        Some(Self(bytes))
    }

    /// Returns the underlying bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns true if every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 32]
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({self})")
    }
}

// HASHING
// ================================================================================================

/// Returns the first 256 bits of SHA-512 over `data` ("SHA-512 half"), the ledger's standard
/// object hash.
pub fn sha512h(data: impl AsRef<[u8]>) -> Hash256 {
    let digest = Sha512::digest(data.as_ref());
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..32]);
    Hash256(out)
}

/// Returns the first 256 bits of SHA-512 over the concatenation of the provided slices.
pub fn sha512h_parts(parts: &[&[u8]]) -> Hash256 {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..32]);
    Hash256(out)
}

// TESTS
// ================================================================================================
