//! The collaborator seam between the execution core and the ledger's apply pipeline.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use hooks_objects::ledger::LedgerEntry;
use hooks_objects::transaction::Transaction;
use hooks_objects::{AccountId, Hash256, Keylet};

use crate::errors::ApplyError;

// LEDGER VIEW
// ================================================================================================

/// Read access to the ledger snapshot a hook runs against.
///
/// The view is fixed for the duration of one apply pass: a running hook observes committed
/// state plus its own staged writes, never the writes of concurrently-running hooks.
pub trait LedgerView: Send + Sync {
    /// The transaction whose processing fired this hook.
    fn otxn(&self) -> Arc<Transaction>;

    /// Looks up a ledger object by keylet.
    fn read_object(&self, keylet: &Keylet) -> Option<Arc<LedgerEntry>>;

    /// Reads one hook state entry of the given owner.
    fn read_state(&self, owner: AccountId, key: Hash256) -> Option<Vec<u8>>;

    /// The sequence number of the ledger being built.
    fn ledger_seq(&self) -> u32;

    /// The ledger's minimum fee unit, in drops.
    fn base_fee(&self) -> u64;
}

// APPLY CONTEXT
// ================================================================================================

/// The apply pipeline a hook invocation runs inside.
///
/// The context owns the snapshot view and the single ledger-transaction boundary the commit
/// protocol requires: a batch either applies in full or not at all.
pub trait ApplyContext {
    /// Returns the shared snapshot for this apply pass.
    fn view(&self) -> Arc<dyn LedgerView>;

    /// Atomically applies a commit batch: state writes first, then emission attachments.
    fn apply_batch(&mut self, batch: ApplyBatch) -> Result<(), ApplyError>;

    /// Receives the diagnostic trace of a finished invocation.
    fn record_trace(&mut self, events: Vec<TraceEvent>);
}

// APPLY BATCH
// ================================================================================================

/// One staged state mutation, keyed by the owning account and the 256-bit state key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateOp {
    /// Create or overwrite the entry.
    Set { owner: AccountId, key: Hash256, value: Vec<u8> },
    /// Remove the entry if present.
    Erase { owner: AccountId, key: Hash256 },
}

impl StateOp {
    /// The state key this operation addresses.
    pub fn key(&self) -> Hash256 {
        match self {
            Self::Set { key, .. } | Self::Erase { key, .. } => *key,
        }
    }
}

/// Everything an accepted hook asks the ledger to do, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyBatch {
    /// State mutations in ascending key order.
    pub state_ops: Vec<StateOp>,
    /// Emitted transactions in emission order.
    pub emitted: Vec<Transaction>,
}

impl ApplyBatch {
    pub fn is_empty(&self) -> bool {
        self.state_ops.is_empty() && self.emitted.is_empty()
    }
}

// TRACE EVENTS
// ================================================================================================

/// One diagnostic record produced by the guest's `trace*` calls.
///
/// Trace events are out-of-band: they never influence ledger state and are surfaced to the
/// embedder whatever the verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// `trace`: a message, rendered as text or hex per the guest's request.
    Message(String),
    /// `trace_num`: a labelled number.
    Number { label: String, number: i64 },
    /// `trace_slot`: the hex image of a slotted object.
    Slot { slot: u32, data: String },
}
