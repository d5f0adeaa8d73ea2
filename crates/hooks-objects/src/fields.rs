use core::fmt;

// FIELD TYPE
// ================================================================================================

/// The serializable type of a field.
///
/// The numeric values are wire codes: they form the high nibble of a field header and define the
/// canonical sort order together with the field code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FieldType {
    UInt16 = 1,
    UInt32 = 2,
    UInt64 = 3,
    Hash256 = 5,
    Amount = 6,
    Blob = 7,
    AccountId = 8,
    Object = 14,
    Array = 15,
}

impl FieldType {
    /// Parses a type from its wire code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::UInt16),
            2 => Some(Self::UInt32),
            3 => Some(Self::UInt64),
            5 => Some(Self::Hash256),
            6 => Some(Self::Amount),
            7 => Some(Self::Blob),
            8 => Some(Self::AccountId),
            14 => Some(Self::Object),
            15 => Some(Self::Array),
            _ => None,
        }
    }

    /// Returns the fixed payload length for fixed-size types, `None` for length-prefixed and
    /// container types.
    pub fn fixed_len(self) -> Option<usize> {
        match self {
            Self::UInt16 => Some(2),
            Self::UInt32 => Some(4),
            Self::UInt64 | Self::Amount => Some(8),
            Self::Hash256 => Some(32),
            Self::Blob | Self::AccountId | Self::Object | Self::Array => None,
        }
    }

    /// Returns true for types whose payload carries a variable-length prefix.
    pub fn is_vl(self) -> bool {
        matches!(self, Self::Blob | Self::AccountId)
    }
}

// FIELD ID
// ================================================================================================

/// Identifies one field: a serializable type plus a field code unique within that type.
///
/// The `u32` packing `(type << 16) | field` is the form field ids take on the host-call ABI.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId {
    pub field_type: FieldType,
    pub code: u8,
}

impl FieldId {
    pub const fn new(field_type: FieldType, code: u8) -> Self {
        Self { field_type, code }
    }

    /// Packs this id into the 32-bit ABI form.
    pub fn to_u32(self) -> u32 {
        ((self.field_type as u32) << 16) | self.code as u32
    }

    /// Unpacks a 32-bit ABI field id.
    pub fn from_u32(raw: u32) -> Option<Self> {
        let type_code = u8::try_from(raw >> 16).ok()?;
        let code = u8::try_from(raw & 0xffff).ok()?;
        Some(Self { field_type: FieldType::from_code(type_code)?, code })
    }

    /// Returns the registered name of this field, if any.
    pub fn name(self) -> Option<&'static str> {
        REGISTRY
            .iter()
            .find_map(|(id, name)| (*id == self).then_some(*name))
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{:?}:{}", self.field_type, self.code),
        }
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldId({self})")
    }
}

// FIELD REGISTRY
// ================================================================================================

macro_rules! fields {
    ($($name:ident: $ty:ident / $code:literal),* $(,)?) => {
        $(pub const $name: FieldId = FieldId::new(FieldType::$ty, $code);)*

        const REGISTRY: &[(FieldId, &str)] = &[
            $(($name, stringify!($name)),)*
        ];
    };
}

fields! {
    TRANSACTION_TYPE: UInt16 / 2,
    SIGNER_WEIGHT: UInt16 / 3,
    HOOK_SET_OPERATION: UInt16 / 10,
    HOOK_API_VERSION: UInt16 / 11,

    FLAGS: UInt32 / 2,
    SEQUENCE: UInt32 / 4,
    EMIT_GENERATION: UInt32 / 10,
    HOOK_SEQUENCE: UInt32 / 11,
    HOOK_REORDER: UInt32 / 12,

    EMIT_BURDEN: UInt64 / 10,
    HOOK_ON: UInt64 / 11,

    EMIT_PARENT_TXN_ID: Hash256 / 10,
    EMIT_NONCE: Hash256 / 11,
    EMIT_HOOK_HASH: Hash256 / 12,
    HOOK_NAMESPACE: Hash256 / 13,
    HOOK_HASH: Hash256 / 14,

    AMOUNT: Amount / 1,
    FEE: Amount / 8,

    SIGNING_PUB_KEY: Blob / 3,
    TXN_SIGNATURE: Blob / 4,
    CREATE_CODE: Blob / 10,
    HOOK_PARAMETER_NAME: Blob / 11,
    HOOK_PARAMETER_VALUE: Blob / 12,

    ACCOUNT: AccountId / 1,
    DESTINATION: AccountId / 3,
    EMIT_CALLBACK: AccountId / 10,

    EMIT_DETAILS: Object / 10,
    SIGNER_ENTRY: Object / 11,
    SIGNER: Object / 12,
    HOOK_SET: Object / 13,
    HOOK_DEFINITION: Object / 14,
    HOOK_PARAMETER: Object / 15,

    SIGNERS: Array / 3,
    SIGNER_ENTRIES: Array / 4,
    HOOK_PARAMETERS: Array / 10,
}

// TESTS
// ================================================================================================
