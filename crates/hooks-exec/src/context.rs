//! The per-invocation execution context.

use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::sync::Arc;
use alloc::vec::Vec;

use hooks_objects::ledger::LedgerEntry;
use hooks_objects::transaction::Transaction;
use hooks_objects::{AccountId, Hash256, Keylet};

use crate::api::HookExecLimits;
use crate::apply::TraceEvent;

// VERDICT
// ================================================================================================

/// The terminal status of a hook invocation.
///
/// A context starts `Unset` and moves to exactly one of the other states; the transition
/// happens once and is never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum Verdict {
    /// The guest has not terminated yet.
    Unset = -2,
    /// The VM trapped, binding failed, or a guard tripped.
    WasmError = -1,
    /// The guest called `rollback`, or returned without a terminal call.
    Rollback = 0,
    /// The guest called `accept`; staged effects are committed.
    Accept = 1,
}

// SLOT
// ================================================================================================

/// A numbered handle to a ledger object materialized for the guest.
///
/// The `Arc` keeps the borrowed bytes alive until the slot is cleared, reassigned, or the
/// context is dropped.
#[derive(Debug, Clone)]
pub struct Slot {
    pub entry: Arc<LedgerEntry>,
}

impl Slot {
    /// The serialized image the guest reads fields out of.
    pub fn bytes(&self) -> &[u8] {
        self.entry.data()
    }

    pub fn keylet(&self) -> Keylet {
        self.entry.keylet()
    }
}

// STATE ENTRY
// ================================================================================================

/// One entry of the pending-state map: a cached or staged value for a state key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntry {
    /// True when the value must be written back on accept; false for read caches.
    pub dirty: bool,
    /// The value; empty and dirty means staged deletion.
    pub value: Vec<u8>,
}

// EXECUTION CONTEXT
// ================================================================================================

/// The mutable record of one hook invocation.
///
/// Created by the runner, threaded exclusively through every host call, and destroyed after
/// commit or discard. Nothing in here outlives the invocation.
#[derive(Debug)]
pub struct ExecutionContext {
    // Pinned at construction.
    pub account: AccountId,
    pub hook_hash: Hash256,
    pub account_keylet: Keylet,
    pub owner_dir_keylet: Keylet,
    pub hook_keylet: Keylet,
    pub limits: HookExecLimits,
    pub otxn: Arc<Transaction>,

    // Slot table.
    pub slots: BTreeMap<u8, Slot>,
    pub slot_counter: u32,
    pub slot_free: VecDeque<u8>,

    // Emission accounting.
    pub expected_etxn_count: i64,
    pub emitted: VecDeque<Transaction>,

    // Nonce accounting.
    pub nonce_counter: u32,
    pub nonces_used: BTreeSet<Hash256>,

    // Lazily computed caches of the triggering transaction.
    pub generation: Option<u32>,
    pub burden: Option<u64>,
    pub fee_base: Option<u64>,

    // Iteration guards.
    pub guard_map: BTreeMap<u32, u32>,

    // Pending state: staged writes and read caches for the hook account.
    pub changed_state: BTreeMap<Hash256, StateEntry>,

    // Terminal status.
    pub verdict: Verdict,
    pub exit_reason: Vec<u8>,
    pub exit_code: i64,

    // Out-of-band diagnostics.
    pub trace_log: Vec<TraceEvent>,
}

impl ExecutionContext {
    /// Creates a fresh context pinned to the given hook account and triggering transaction.
    pub fn new(
        account: AccountId,
        hook_hash: Hash256,
        otxn: Arc<Transaction>,
        limits: HookExecLimits,
    ) -> Self {
        Self {
            account,
            hook_hash,
            account_keylet: Keylet::account(account),
            owner_dir_keylet: Keylet::owner_dir(account),
            hook_keylet: Keylet::hook(account),
            limits,
            otxn,
            slots: BTreeMap::new(),
            slot_counter: 1,
            slot_free: VecDeque::new(),
            expected_etxn_count: -1,
            emitted: VecDeque::new(),
            nonce_counter: 0,
            nonces_used: BTreeSet::new(),
            generation: None,
            burden: None,
            fee_base: None,
            guard_map: BTreeMap::new(),
            changed_state: BTreeMap::new(),
            verdict: Verdict::Unset,
            exit_reason: Vec::new(),
            exit_code: -1,
            trace_log: Vec::new(),
        }
    }

    /// Records the terminal verdict; the first transition wins and later attempts are ignored.
    pub fn finish(&mut self, verdict: Verdict, reason: &[u8], code: i64) {
        if self.verdict != Verdict::Unset {
            return;
        }
        self.verdict = verdict;
        self.exit_reason = reason.to_vec();
        self.exit_code = code;
    }

    /// Returns true once a terminal verdict is recorded.
    pub fn is_terminal(&self) -> bool {
        self.verdict != Verdict::Unset
    }

    /// Picks the next slot id: an explicitly requested id, a reclaimed one, or the counter.
    /// Returns `None` when all 255 ids are in use.
    pub fn next_slot_id(&mut self, requested: u32) -> Option<u8> {
        if requested != 0 {
            let id = u8::try_from(requested).ok()?;
            // An explicitly reoccupied id must not be handed out again.
            self.slot_free.retain(|freed| *freed != id);
            return Some(id);
        }
        if let Some(id) = self.slot_free.pop_front() {
            return Some(id);
        }
        if self.slot_counter > crate::api::MAX_SLOTS {
            return None;
        }
        let id = self.slot_counter as u8;
        self.slot_counter += 1;
        Some(id)
    }
}

// TESTS
// ================================================================================================
