use std::fmt::Write as _;

use hooks_objects::fields;
use hooks_objects::sto::StBuilder;
use hooks_objects::transaction::{Transaction, TxType};
use hooks_objects::AccountId;

// GUEST ASSEMBLY
// ================================================================================================

/// Assembles a WAT guest into bytecode.
pub fn compile_wat(wat: &str) -> Vec<u8> {
    wat::parse_str(wat).expect("guest fixture must assemble")
}

/// Escapes bytes for a WAT data segment string literal.
pub fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for byte in bytes {
        write!(out, "\\{byte:02x}").expect("writing to a string cannot fail");
    }
    out
}

// TRANSACTION FIXTURES
// ================================================================================================

/// A minimal payment, parsed.
pub fn simple_payment(from: AccountId, to: AccountId) -> Transaction {
    Transaction::from_bytes(payment_bytes(from, to, 12)).expect("fixture payment parses")
}

/// The canonical image of a payment template suitable for `emit`: no signature, a fee high
/// enough to clear any small floor.
pub fn payment_template(from: AccountId, to: AccountId, fee: u64) -> Vec<u8> {
    payment_bytes(from, to, fee)
}

fn payment_bytes(from: AccountId, to: AccountId, fee: u64) -> Vec<u8> {
    StBuilder::new()
        .u16(fields::TRANSACTION_TYPE, TxType::Payment as u16)
        .u32(fields::SEQUENCE, 5)
        .amount(fields::AMOUNT, 5000)
        .amount(fields::FEE, fee)
        .account(fields::ACCOUNT, from)
        .account(fields::DESTINATION, to)
        .build()
        .expect("fixture fields are canonical")
}
