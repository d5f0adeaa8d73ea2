use std::collections::BTreeMap;
use std::sync::Arc;

use hooks_exec::{ApplyBatch, ApplyContext, ApplyError, LedgerView, StateOp, TraceEvent};
use hooks_objects::ledger::LedgerEntry;
use hooks_objects::transaction::Transaction;
use hooks_objects::{AccountId, Hash256, Keylet};

// MOCK LEDGER
// ================================================================================================

/// An in-memory ledger standing in for the apply pipeline.
///
/// Views are snapshots: each [`ApplyContext::view`] clones the current contents, so a running
/// hook never observes writes that happen behind its back. Batches apply all-or-nothing, the
/// way the real pipeline's ledger-transaction boundary behaves.
pub struct MockLedger {
    otxn: Arc<Transaction>,
    state: BTreeMap<(AccountId, Hash256), Vec<u8>>,
    objects: BTreeMap<Keylet, Arc<LedgerEntry>>,
    ledger_seq: u32,
    base_fee: u64,
    /// When set, every object lookup resolves to a synthetic entry.
    wildcard_objects: bool,
    /// When set, batches carrying emissions are rejected, exercising the atomic-rollback path.
    reject_emissions: bool,

    /// Emitted transactions attached by accepted hooks, in attachment order.
    pub emitted: Vec<Transaction>,
    /// Traces recorded by finished invocations.
    pub traces: Vec<TraceEvent>,
}

impl MockLedger {
    /// Creates a ledger whose next apply pass processes `otxn`.
    pub fn new(otxn: Transaction) -> Self {
        Self {
            otxn: Arc::new(otxn),
            state: BTreeMap::new(),
            objects: BTreeMap::new(),
            ledger_seq: 3,
            base_fee: 10,
            wildcard_objects: false,
            reject_emissions: false,
            emitted: Vec::new(),
            traces: Vec::new(),
        }
    }

    pub fn with_state(mut self, owner: AccountId, key: Hash256, value: Vec<u8>) -> Self {
        self.state.insert((owner, key), value);
        self
    }

    pub fn with_object(mut self, entry: LedgerEntry) -> Self {
        self.objects.insert(entry.keylet(), Arc::new(entry));
        self
    }

    /// Makes every object lookup succeed with a synthetic entry.
    pub fn with_wildcard_objects(mut self) -> Self {
        self.wildcard_objects = true;
        self
    }

    /// Makes emission attachment fail, for exercising commit rollback.
    pub fn with_rejected_emissions(mut self) -> Self {
        self.reject_emissions = true;
        self
    }

    pub fn with_base_fee(mut self, base_fee: u64) -> Self {
        self.base_fee = base_fee;
        self
    }

    /// Reads a state entry as it stands now.
    pub fn state_of(&self, owner: AccountId, key: Hash256) -> Option<&[u8]> {
        self.state.get(&(owner, key)).map(Vec::as_slice)
    }

    /// A byte-comparable snapshot of the whole state, for pre/post assertions.
    pub fn state_snapshot(&self) -> BTreeMap<(AccountId, Hash256), Vec<u8>> {
        self.state.clone()
    }
}

impl ApplyContext for MockLedger {
    fn view(&self) -> Arc<dyn LedgerView> {
        Arc::new(MockView {
            otxn: self.otxn.clone(),
            state: self.state.clone(),
            objects: self.objects.clone(),
            ledger_seq: self.ledger_seq,
            base_fee: self.base_fee,
            wildcard_objects: self.wildcard_objects,
        })
    }

    fn apply_batch(&mut self, batch: ApplyBatch) -> Result<(), ApplyError> {
        // Validate the whole batch before touching anything.
        if self.reject_emissions && !batch.emitted.is_empty() {
            return Err(ApplyError::EmissionRejected("emissions disabled".into()));
        }
        for op in &batch.state_ops {
            if let StateOp::Set { value, .. } = op {
                if value.is_empty() {
                    return Err(ApplyError::WriteFailed("empty value in set".into()));
                }
            }
        }

        for op in batch.state_ops {
            match op {
                StateOp::Set { owner, key, value } => {
                    self.state.insert((owner, key), value);
                },
                StateOp::Erase { owner, key } => {
                    self.state.remove(&(owner, key));
                },
            }
        }
        self.emitted.extend(batch.emitted);
        Ok(())
    }

    fn record_trace(&mut self, events: Vec<TraceEvent>) {
        self.traces.extend(events);
    }
}

// MOCK VIEW
// ================================================================================================

/// One snapshot of the mock ledger.
pub struct MockView {
    otxn: Arc<Transaction>,
    state: BTreeMap<(AccountId, Hash256), Vec<u8>>,
    objects: BTreeMap<Keylet, Arc<LedgerEntry>>,
    ledger_seq: u32,
    base_fee: u64,
    wildcard_objects: bool,
}

impl LedgerView for MockView {
    fn otxn(&self) -> Arc<Transaction> {
        self.otxn.clone()
    }

    fn read_object(&self, keylet: &Keylet) -> Option<Arc<LedgerEntry>> {
        if let Some(entry) = self.objects.get(keylet) {
            return Some(entry.clone());
        }
        if self.wildcard_objects {
            // A synthetic one-field entry; enough for slot accounting tests.
            let data = hooks_objects::sto::StBuilder::new()
                .hash(hooks_objects::fields::HOOK_NAMESPACE, keylet.key)
                .build()
                .expect("single field is canonical");
            return Some(Arc::new(LedgerEntry::new(*keylet, data)));
        }
        None
    }

    fn read_state(&self, owner: AccountId, key: Hash256) -> Option<Vec<u8>> {
        self.state.get(&(owner, key)).cloned()
    }

    fn ledger_seq(&self) -> u32 {
        self.ledger_seq
    }

    fn base_fee(&self) -> u64 {
        self.base_fee
    }
}
