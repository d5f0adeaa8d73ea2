use alloc::string::String;

use thiserror::Error;

use crate::fields::FieldId;

// ADDRESS ERROR
// ================================================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address contains a character outside the base58 alphabet")]
    InvalidCharacter,
    #[error("decoded address is {0} bytes, expected 25")]
    InvalidAddressLength(usize),
    #[error("account id payload is {0} bytes, expected 20")]
    InvalidIdLength(usize),
    #[error("address type prefix {0:#04x} is not an account prefix")]
    InvalidPrefix(u8),
    #[error("address checksum does not match payload")]
    ChecksumMismatch,
}

// SERIALIZATION ERROR
// ================================================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SerializationError {
    #[error("unexpected end of input at offset {0}")]
    UnexpectedEof(usize),
    #[error("field header at offset {0} is malformed")]
    MalformedHeader(usize),
    #[error("type code {0} does not name a serializable type")]
    UnknownType(u8),
    #[error("variable length prefix at offset {0} is out of range")]
    InvalidLengthPrefix(usize),
    #[error("fields are not in canonical order at offset {0}")]
    NonCanonicalOrder(usize),
    #[error("container opened at offset {0} is missing its end marker")]
    UnterminatedContainer(usize),
    #[error("payload for field {0} has invalid length {1}")]
    InvalidPayloadLength(FieldId, usize),
    #[error("field {0} appears more than once in one container")]
    DuplicateField(FieldId),
}

// TRANSACTION ERROR
// ================================================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
    #[error("transaction image is malformed")]
    Malformed(#[source] SerializationError),
    #[error("transaction has no TransactionType field")]
    MissingTransactionType,
    #[error("transaction type {0} is not known")]
    UnknownTransactionType(u16),
    #[error("transaction has no Account field")]
    MissingAccount,
    #[error("emit details are incomplete: missing {0}")]
    IncompleteEmitDetails(&'static str),
}

// INNER OBJECT ERROR
// ================================================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InnerObjectError {
    #[error("object is malformed")]
    Malformed(#[source] SerializationError),
    #[error("required field {field} is missing from {format}")]
    MissingRequiredField { format: String, field: FieldId },
    #[error("field {field} is not part of the {format} template")]
    UnexpectedField { format: String, field: FieldId },
    #[error("no inner object format is registered for field {0}")]
    UnknownFormat(FieldId),
}
