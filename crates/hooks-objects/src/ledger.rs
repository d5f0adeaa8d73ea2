use alloc::vec::Vec;

use crate::keylet::Keylet;
use crate::sto::StReader;

// LEDGER ENTRY
// ================================================================================================

/// A materialized ledger object: its keylet and its serialized field image.
///
/// Entries handed to a running hook are immutable snapshots; guests observe them through slots
/// and never mutate them in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    keylet: Keylet,
    data: Vec<u8>,
}

impl LedgerEntry {
    /// Creates a new entry from a keylet and a serialized field image.
    pub fn new(keylet: Keylet, data: Vec<u8>) -> Self {
        Self { keylet, data }
    }

    pub fn keylet(&self) -> Keylet {
        self.keylet
    }

    /// The serialized field image.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns a reader over the field image.
    pub fn reader(&self) -> StReader<'_> {
        StReader::new(&self.data)
    }
}
