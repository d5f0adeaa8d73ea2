//! Test support for the hook execution core: an in-memory ledger implementing the apply
//! contract, and helpers for assembling small WAT guests.

mod mock_ledger;
pub use mock_ledger::{MockLedger, MockView};

mod guests;
pub use guests::{compile_wat, escape_bytes, payment_template, simple_payment};
