#![no_std]

#[macro_use]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod account;
pub mod fields;
pub mod hook;
pub mod keylet;
pub mod ledger;
pub mod sto;
pub mod transaction;

mod errors;
mod hash;

// RE-EXPORTS
// ================================================================================================

pub use account::AccountId;
pub use errors::{
    AddressError,
    InnerObjectError,
    SerializationError,
    TransactionError,
};
pub use hash::{sha512h, sha512h_parts, Hash256};
pub use keylet::{Keylet, KeyletSpace};
