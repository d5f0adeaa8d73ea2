use alloc::string::String;
use alloc::vec::Vec;

use crate::account::AccountId;
use crate::errors::TransactionError;
use crate::fields::{self, FieldId, FieldType};
use crate::hash::{sha512h_parts, Hash256};
use crate::sto::{self, StBuilder, StField, StReader};

// TRANSACTION TYPE
// ================================================================================================

/// The ledger's transaction type enumeration.
///
/// The numeric values are wire values of the `TransactionType` field and double as bit positions
/// in a hook's `hook_on` mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum TxType {
    Payment = 0,
    EscrowCreate = 1,
    EscrowFinish = 2,
    AccountSet = 3,
    EscrowCancel = 4,
    SetRegularKey = 5,
    OfferCreate = 7,
    OfferCancel = 8,
    TicketCreate = 10,
    SignerListSet = 12,
    PaychanCreate = 13,
    PaychanFund = 14,
    PaychanClaim = 15,
    CheckCreate = 16,
    CheckCash = 17,
    CheckCancel = 18,
    DepositPreauth = 19,
    TrustSet = 20,
    AccountDelete = 21,
    SetHook = 22,
}

impl TxType {
    /// Parses a transaction type from its wire value.
    pub fn from_wire(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::Payment),
            1 => Some(Self::EscrowCreate),
            2 => Some(Self::EscrowFinish),
            3 => Some(Self::AccountSet),
            4 => Some(Self::EscrowCancel),
            5 => Some(Self::SetRegularKey),
            7 => Some(Self::OfferCreate),
            8 => Some(Self::OfferCancel),
            10 => Some(Self::TicketCreate),
            12 => Some(Self::SignerListSet),
            13 => Some(Self::PaychanCreate),
            14 => Some(Self::PaychanFund),
            15 => Some(Self::PaychanClaim),
            16 => Some(Self::CheckCreate),
            17 => Some(Self::CheckCash),
            18 => Some(Self::CheckCancel),
            19 => Some(Self::DepositPreauth),
            20 => Some(Self::TrustSet),
            21 => Some(Self::AccountDelete),
            22 => Some(Self::SetHook),
            _ => None,
        }
    }
}

/// Returns true when a hook with the given `hook_on` mask fires for `tx_type`.
///
/// Bit `i` of the mask enables firing on transaction type `i`. `SetHook` transactions never
/// fire hooks, whatever the mask says: a hook must not run while the hook set on the account is
/// itself being changed.
pub fn can_hook(tx_type: TxType, hook_on: u64) -> bool {
    if tx_type == TxType::SetHook {
        return false;
    }
    hook_on & (1u64 << (tx_type as u16)) != 0
}

// EMIT DETAILS
// ================================================================================================

/// Prefix mixed into a transaction id hash.
const TXN_ID_PREFIX: &[u8] = b"TXN\0";

/// Emission lineage stamped onto every emitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitDetails {
    pub generation: u32,
    pub burden: u64,
    pub parent_txn_id: Hash256,
    pub nonce: Hash256,
    pub hook_hash: Hash256,
    pub callback: AccountId,
}

impl EmitDetails {
    /// Byte length of the canonically encoded `EmitDetails` field.
    pub const SIZE: usize = 137;

    /// Encodes this record as a complete `EmitDetails` object field.
    pub fn to_field_bytes(&self) -> Vec<u8> {
        StBuilder::new()
            .begin_object(fields::EMIT_DETAILS)
            .u32(fields::EMIT_GENERATION, self.generation)
            .u64(fields::EMIT_BURDEN, self.burden)
            .hash(fields::EMIT_PARENT_TXN_ID, self.parent_txn_id)
            .hash(fields::EMIT_NONCE, self.nonce)
            .hash(fields::EMIT_HOOK_HASH, self.hook_hash)
            .account(fields::EMIT_CALLBACK, self.callback)
            .end_object()
            .build()
            .expect("emit details fields are appended in canonical order")
    }

    /// Decodes an `EmitDetails` object payload.
    fn from_payload(payload: &[u8]) -> Result<Self, TransactionError> {
        let reader = StReader::new(payload);
        let fields_read = reader.fields().map_err(TransactionError::Malformed)?;
        let get = |id: FieldId| fields_read.iter().find(|f| f.id == id);

        let generation = get(fields::EMIT_GENERATION)
            .and_then(|f| sto::read_u32(reader.payload(f)))
            .ok_or(TransactionError::IncompleteEmitDetails("EmitGeneration"))?;
        let burden = get(fields::EMIT_BURDEN)
            .and_then(|f| sto::read_u64(reader.payload(f)))
            .ok_or(TransactionError::IncompleteEmitDetails("EmitBurden"))?;
        let parent_txn_id = get(fields::EMIT_PARENT_TXN_ID)
            .and_then(|f| sto::read_hash(reader.payload(f)))
            .ok_or(TransactionError::IncompleteEmitDetails("EmitParentTxnID"))?;
        let nonce = get(fields::EMIT_NONCE)
            .and_then(|f| sto::read_hash(reader.payload(f)))
            .ok_or(TransactionError::IncompleteEmitDetails("EmitNonce"))?;
        let hook_hash = get(fields::EMIT_HOOK_HASH)
            .and_then(|f| sto::read_hash(reader.payload(f)))
            .ok_or(TransactionError::IncompleteEmitDetails("EmitHookHash"))?;
        let callback = get(fields::EMIT_CALLBACK)
            .and_then(|f| sto::read_account(reader.payload(f)))
            .ok_or(TransactionError::IncompleteEmitDetails("EmitCallback"))?;

        Ok(Self { generation, burden, parent_txn_id, nonce, hook_hash, callback })
    }
}

// TRANSACTION
// ================================================================================================

/// A parsed transaction, retaining its canonical byte image.
///
/// The image is the source of truth: accessors decode from the retained field index, and the
/// transaction id is the hash of the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    bytes: Vec<u8>,
    index: Vec<StField>,
    tx_type: TxType,
    account: AccountId,
}

impl Transaction {
    /// Parses a transaction from its serialized image.
    ///
    /// # Errors
    /// Returns an error if the image is malformed, or the `TransactionType` or `Account` fields
    /// are missing or undecodable.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, TransactionError> {
        let index = StReader::new(&bytes).fields().map_err(TransactionError::Malformed)?;
        let reader = StReader::new(&bytes);

        let tx_type_raw = index
            .iter()
            .find(|f| f.id == fields::TRANSACTION_TYPE)
            .and_then(|f| sto::read_u16(reader.payload(f)))
            .ok_or(TransactionError::MissingTransactionType)?;
        let tx_type =
            TxType::from_wire(tx_type_raw).ok_or(TransactionError::UnknownTransactionType(tx_type_raw))?;

        let account = index
            .iter()
            .find(|f| f.id == fields::ACCOUNT)
            .and_then(|f| sto::read_account(reader.payload(f)))
            .ok_or(TransactionError::MissingAccount)?;

        Ok(Self { bytes, index, tx_type, account })
    }

    /// Returns the canonical byte image.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the transaction id: the prefixed hash of the image.
    pub fn id(&self) -> Hash256 {
        sha512h_parts(&[TXN_ID_PREFIX, &self.bytes])
    }

    pub fn tx_type(&self) -> TxType {
        self.tx_type
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    /// Returns the fee in drops, or 0 when the field is absent.
    pub fn fee(&self) -> u64 {
        self.field(fields::FEE).and_then(sto::read_u64).unwrap_or(0)
    }

    /// Returns the payload bytes of a top-level field.
    pub fn field(&self, id: FieldId) -> Option<&[u8]> {
        let field = self.index.iter().find(|f| f.id == id)?;
        Some(&self.bytes[field.payload.clone()])
    }

    /// Returns the full span (header included) of a top-level field.
    pub fn field_full(&self, id: FieldId) -> Option<&[u8]> {
        let field = self.index.iter().find(|f| f.id == id)?;
        Some(&self.bytes[field.full.clone()])
    }

    /// Returns the emission lineage, or `None` for a transaction that was not emitted.
    pub fn emit_details(&self) -> Option<Result<EmitDetails, TransactionError>> {
        self.field(fields::EMIT_DETAILS).map(EmitDetails::from_payload)
    }

    /// Emission generation of this transaction; 0 for non-emitted transactions.
    pub fn generation(&self) -> u32 {
        match self.emit_details() {
            Some(Ok(details)) => details.generation,
            _ => 0,
        }
    }

    /// Emission burden of this transaction; 1 for non-emitted transactions.
    pub fn burden(&self) -> u64 {
        match self.emit_details() {
            Some(Ok(details)) if details.burden > 0 => details.burden,
            _ => 1,
        }
    }
}

// TEXT RENDITIONS
// ================================================================================================

/// Renders a field payload as text: integers decimal, hashes and blobs hex, accounts as their
/// base58 address.
pub fn field_to_text(id: FieldId, payload: &[u8]) -> Option<String> {
    match id.field_type {
        FieldType::UInt16 => sto::read_u16(payload).map(|v| format!("{v}")),
        FieldType::UInt32 => sto::read_u32(payload).map(|v| format!("{v}")),
        FieldType::UInt64 | FieldType::Amount => sto::read_u64(payload).map(|v| format!("{v}")),
        FieldType::Hash256 => sto::read_hash(payload).map(|h| format!("{h}")),
        FieldType::Blob => Some(hex::encode_upper(payload)),
        FieldType::AccountId => sto::read_account(payload).map(|a| a.to_address()),
        FieldType::Object | FieldType::Array => Some(hex::encode_upper(payload)),
    }
}

// TESTS
// ================================================================================================
