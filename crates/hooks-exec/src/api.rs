//! The host-call ABI: error codes, protocol constants and shared value helpers.

// API ERROR
// ================================================================================================

/// The closed error enumeration of the host-call ABI.
///
/// Host calls return a single `i64`: non-negative on success (usually a byte count or a domain
/// value), or one of these negative codes. The enumeration is part of consensus and must never
/// be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum ApiError {
    /// A pointer/length pair does not fit the guest's linear memory.
    OutOfBounds = -1,
    /// The host encountered an inconsistency that is not the guest's fault.
    InternalError = -2,
    /// A supplied or produced value exceeds its limit.
    TooBig = -3,
    /// A supplied buffer or value is smaller than the operation requires.
    TooSmall = -4,
    /// The requested object, field or state entry was not found.
    DoesntExist = -5,
    /// All 255 slots are occupied.
    NoFreeSlots = -6,
    /// An argument does not name a valid domain value.
    InvalidArgument = -7,
    /// A once-only parameter was already set.
    AlreadySet = -8,
    /// A required prior call has not been made.
    PrerequisiteNotMet = -9,
    /// The operation would produce an absurd fee.
    FeeTooLarge = -10,
    /// An emitted transaction was rejected.
    EmissionFailure = -11,
    /// All 255 nonces of this invocation have been produced.
    TooManyNonces = -12,
    /// The emission queue is already at its declared bound.
    TooManyEmittedTxn = -13,
    /// The API exists but is reserved for a future version.
    NotImplemented = -14,
    /// An account id or address failed to parse.
    InvalidAccount = -15,
    /// A guarded loop exceeded its declared iteration bound.
    GuardViolation = -16,
    /// The requested field id is invalid or the field is absent.
    InvalidField = -17,
    /// Input the guest asked the host to parse was malformed.
    ParseError = -18,
}

impl ApiError {
    /// Returns the ABI value of this error.
    pub const fn code(self) -> i64 {
        self as i64
    }
}

/// The `i64` a host call hands back to the guest.
pub type HostReturn = Result<i64, ApiError>;

/// Flattens a [HostReturn] onto the single-integer ABI channel.
pub fn flatten(ret: HostReturn) -> i64 {
    match ret {
        Ok(value) => value,
        Err(error) => error.code(),
    }
}

// PROTOCOL CONSTANTS
// ================================================================================================

/// Slot ids run from 1 to 255.
pub const MAX_SLOTS: u32 = 255;

/// At most 255 nonces per invocation.
pub const MAX_NONCES: u32 = 255;

/// At most 255 emitted transactions per invocation.
pub const MAX_EMITTED: u32 = 255;

/// Fee floor per emitted byte, in drops.
pub const DROPS_PER_BYTE: u64 = 31_250;

/// Ceiling on any single emitted transaction's fee, in drops.
pub const MAX_EMIT_FEE: u64 = 1_000_000_000_000;

// RESOURCE LIMITS
// ================================================================================================

/// Injected resource limits for one hook invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookExecLimits {
    /// Largest accepted hook state value, in bytes.
    pub max_state_entry_size: usize,
}

impl Default for HookExecLimits {
    fn default() -> Self {
        Self { max_state_entry_size: 128 }
    }
}

// VALUE HELPERS
// ================================================================================================

/// Decodes up to 8 bytes big-endian into the non-negative `i64` channel.
///
/// Values with the high bit set are rejected with [`ApiError::TooBig`]: a set high bit would
/// collide with the negative error-code channel.
pub fn data_as_int64(bytes: &[u8]) -> HostReturn {
    if bytes.len() > 8 {
        return Err(ApiError::TooBig);
    }
    let mut value: u64 = 0;
    for byte in bytes {
        value = (value << 8) | u64::from(*byte);
    }
    if value & (1u64 << 63) != 0 {
        return Err(ApiError::TooBig);
    }
    Ok(value as i64)
}

/// Computes the minimum fee for emitting `byte_count` bytes against the given base fee:
/// `ceil(byte_count * base_fee * 1.1)`, in integer arithmetic.
pub fn emission_fee_floor(byte_count: u64, base_fee: u64) -> Result<u64, ApiError> {
    let product = (byte_count as u128)
        .checked_mul(base_fee as u128)
        .and_then(|v| v.checked_mul(11))
        .ok_or(ApiError::FeeTooLarge)?;
    let fee = (product + 9) / 10;
    u64::try_from(fee).map_err(|_| ApiError::FeeTooLarge)
}

/// Maps a ledger engine result code into the hook return-code channel: `-(ter << 16)` keeps the
/// TER value recoverable while marking the failure as hook-originated.
pub const fn ter_to_hook_return_code(ter: i64) -> i64 {
    -(ter << 16)
}

/// Engine result claimed by a hook that rolled the transaction back.
pub const TER_HOOK_REJECTED: i64 = 153;

/// Engine result claimed when the guest failed outside its own control flow.
pub const TER_HOOK_ERROR: i64 = 154;

// API NUMBERS
// ================================================================================================

/// Returns the API number of a host call: the CRC32 of its import name. The trampoline `_`
/// dispatches on these.
pub fn api_number(name: &str) -> u32 {
    crc32fast::hash(name.as_bytes())
}

// TESTS
// ================================================================================================
