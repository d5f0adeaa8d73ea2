use alloc::string::String;

use thiserror::Error;

// BIND ERROR
// ================================================================================================

/// Why a bytecode module could not be bound into the sandbox.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("bytecode does not parse as a module")]
    InvalidModule(#[source] wasmi::Error),
    #[error("module imports {module}::{name}, which is not on the import whitelist")]
    IllegalImport { module: String, name: String },
    #[error("imported memory must be `env::memory` with limits (1, 1)")]
    IllegalMemoryImport,
    #[error("imported table must be `env::table`, funcref, within limits (10, 20)")]
    IllegalTableImport,
    #[error("global imports are not provided by the sandbox")]
    IllegalGlobalImport,
    #[error("host function registration failed")]
    Registration(#[source] wasmi::errors::LinkerError),
    #[error("module instantiation failed")]
    Instantiation(#[source] wasmi::Error),
    #[error("modules with a start section are not accepted")]
    StartFunction,
    #[error("module exposes no linear memory")]
    MissingMemory,
    #[error("module does not export entry function `{0}` with signature (i32) -> i64")]
    MissingEntry(&'static str),
}

// APPLY ERROR
// ================================================================================================

/// Why the apply context refused a commit batch.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("state value of {size} bytes exceeds the {max}-byte cap")]
    StateValueTooLarge { size: usize, max: usize },
    #[error("emitted transaction was not accepted by the ledger: {0}")]
    EmissionRejected(String),
    #[error("ledger write failed: {0}")]
    WriteFailed(String),
}

