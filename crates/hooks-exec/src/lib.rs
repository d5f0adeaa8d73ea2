#![no_std]

#[macro_use]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod api;
pub mod apply;
pub mod context;
pub mod host;
pub mod module;

mod commit;
mod errors;
mod memory;
mod runner;

// RE-EXPORTS
// ================================================================================================

pub use api::{ApiError, HookExecLimits};
pub use apply::{ApplyBatch, ApplyContext, LedgerView, StateOp, TraceEvent};
pub use commit::CommitSummary;
pub use context::{ExecutionContext, Verdict};
pub use errors::{ApplyError, BindError};
pub use runner::{apply, HookOutcome, HookResult, HookRunner};
