//! The top-level `apply` entry point: gate, bind, invoke, interpret, commit or discard.

use alloc::vec::Vec;

use wasmi::Engine;

use hooks_objects::hook::HookDefinition;
use hooks_objects::transaction::can_hook;
use hooks_objects::{AccountId, Hash256};

use crate::api::{ter_to_hook_return_code, HookExecLimits, TER_HOOK_ERROR, TER_HOOK_REJECTED};
use crate::apply::ApplyContext;
use crate::commit::{self, CommitSummary};
use crate::context::{ExecutionContext, Verdict};
use crate::host::HostState;
use crate::module::bind_module;

// HOOK RESULT
// ================================================================================================

/// The outcome of presenting a transaction to a hook.
#[derive(Debug)]
pub enum HookOutcome {
    /// The `hook_on` gate rejected the transaction type; nothing was instantiated.
    Skipped,
    /// The hook ran to a verdict.
    Executed(HookResult),
}

impl HookOutcome {
    /// The executed result, if the hook ran.
    pub fn executed(self) -> Option<HookResult> {
        match self {
            Self::Executed(result) => Some(result),
            Self::Skipped => None,
        }
    }
}

/// Everything the embedder learns from one hook invocation.
#[derive(Debug)]
pub struct HookResult {
    pub account: AccountId,
    pub hook_hash: Hash256,
    pub verdict: Verdict,
    pub exit_code: i64,
    pub exit_reason: Vec<u8>,
    /// The entry function's return value on a clean exit without a terminal call.
    pub guest_return: Option<i64>,
    /// The committed diff; empty unless the verdict is ACCEPT.
    pub committed: CommitSummary,
}

impl HookResult {
    /// The value carried on the ledger-result channel: 0 for ACCEPT, a shifted TER code
    /// otherwise, marking the failure as hook-originated.
    pub fn ledger_code(&self) -> i64 {
        match self.verdict {
            Verdict::Accept => 0,
            Verdict::Rollback => ter_to_hook_return_code(TER_HOOK_REJECTED),
            Verdict::WasmError | Verdict::Unset => ter_to_hook_return_code(TER_HOOK_ERROR),
        }
    }
}

// HOOK RUNNER
// ================================================================================================

/// Executes hooks against an apply context.
///
/// The engine is reusable across invocations; instances never are. Limits are injected here
/// and pinned into every context the runner builds.
pub struct HookRunner {
    engine: Engine,
    limits: HookExecLimits,
}

impl Default for HookRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl HookRunner {
    pub fn new() -> Self {
        Self { engine: Engine::default(), limits: HookExecLimits::default() }
    }

    pub fn with_limits(mut self, limits: HookExecLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Runs `definition` against the triggering transaction of `apply_ctx` on behalf of
    /// `account`.
    ///
    /// The lifecycle follows five steps: gate on the transaction type, build a fresh context,
    /// bind the module, invoke the entry symbol (`hook`, or `cbak` when `callback` is set),
    /// and interpret the terminal verdict. Staged effects are committed on ACCEPT and
    /// discarded on anything else.
    pub fn apply(
        &self,
        hook_hash: Hash256,
        definition: &HookDefinition,
        apply_ctx: &mut dyn ApplyContext,
        account: AccountId,
        callback: bool,
    ) -> HookOutcome {
        let view = apply_ctx.view();
        let otxn = view.otxn();

        if !can_hook(otxn.tx_type(), definition.hook_on) {
            return HookOutcome::Skipped;
        }

        let ctx = ExecutionContext::new(account, hook_hash, otxn, self.limits);
        let state = HostState::new(ctx, view);

        let mut bound = match bind_module(&self.engine, &definition.create_code, state) {
            Ok(bound) => bound,
            Err(_) => {
                return HookOutcome::Executed(HookResult {
                    account,
                    hook_hash,
                    verdict: Verdict::WasmError,
                    exit_code: -1,
                    exit_reason: b"module binding failed".to_vec(),
                    guest_return: None,
                    committed: CommitSummary::default(),
                });
            },
        };

        let entry_name = if callback { "cbak" } else { "hook" };
        let entry = bound
            .instance
            .get_typed_func::<i32, i64>(&bound.store, entry_name);

        let mut guest_return = None;
        match entry {
            Ok(entry) => match entry.call(&mut bound.store, 0) {
                Ok(value) => {
                    guest_return = Some(value);
                    bound.store.data_mut().ctx.finish(
                        Verdict::Rollback,
                        b"execution ended without a verdict",
                        0,
                    );
                },
                Err(_) => {
                    // Host-initiated unwinds record their verdict before raising; anything
                    // still unset here is a genuine trap.
                    if !bound.store.data().ctx.is_terminal() {
                        bound.store.data_mut().ctx.finish(
                            Verdict::WasmError,
                            b"guest trapped",
                            0,
                        );
                    }
                },
            },
            Err(_) => {
                bound.store.data_mut().ctx.finish(
                    Verdict::WasmError,
                    b"entry function missing",
                    0,
                );
            },
        }

        let mut ctx = bound.store.into_data().into_context();
        apply_ctx.record_trace(core::mem::take(&mut ctx.trace_log));

        let mut verdict = ctx.verdict;
        let committed = if verdict == Verdict::Accept {
            match commit::commit(&ctx, apply_ctx) {
                Ok(summary) => summary,
                Err(_) => {
                    // The batch failed after the fact; the atomic boundary has already rolled
                    // the state writes back.
                    verdict = Verdict::Rollback;
                    CommitSummary::default()
                },
            }
        } else {
            CommitSummary::default()
        };

        HookOutcome::Executed(HookResult {
            account,
            hook_hash,
            verdict,
            exit_code: ctx.exit_code,
            exit_reason: ctx.exit_reason.clone(),
            guest_return,
            committed,
        })
    }
}

/// Runs one hook with default limits. See [`HookRunner::apply`].
pub fn apply(
    hook_hash: Hash256,
    definition: &HookDefinition,
    apply_ctx: &mut dyn ApplyContext,
    account: AccountId,
    callback: bool,
) -> HookOutcome {
    HookRunner::new().apply(hook_hash, definition, apply_ctx, account, callback)
}
