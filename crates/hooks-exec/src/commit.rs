//! Write-back of an accepted invocation's staged effects.

use alloc::vec::Vec;

use hooks_objects::Hash256;

use crate::apply::{ApplyBatch, ApplyContext, StateOp};
use crate::context::ExecutionContext;
use crate::errors::ApplyError;

// COMMIT SUMMARY
// ================================================================================================

/// What an accepted invocation changed: the applied state diff and the emission count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// Applied writes in key order; `None` marks a deletion.
    pub state_writes: Vec<(Hash256, Option<Vec<u8>>)>,
    pub emitted_count: usize,
}

// COMMIT PROTOCOL
// ================================================================================================

/// Applies the context's staged effects through the apply context's atomic batch boundary.
///
/// Dirty state entries are walked in ascending key order: an empty staged value deletes the
/// entry, anything else writes it. Emitted transactions follow in queue order. The apply
/// context applies the whole batch or none of it, so a late emission failure cannot leave
/// state writes behind.
pub(crate) fn commit(
    ctx: &ExecutionContext,
    apply_ctx: &mut dyn ApplyContext,
) -> Result<CommitSummary, ApplyError> {
    let mut batch = ApplyBatch::default();
    let mut summary = CommitSummary::default();

    for (key, entry) in &ctx.changed_state {
        if !entry.dirty {
            continue;
        }
        if entry.value.is_empty() {
            batch.state_ops.push(StateOp::Erase { owner: ctx.account, key: *key });
            summary.state_writes.push((*key, None));
        } else {
            if entry.value.len() > ctx.limits.max_state_entry_size {
                return Err(ApplyError::StateValueTooLarge {
                    size: entry.value.len(),
                    max: ctx.limits.max_state_entry_size,
                });
            }
            batch.state_ops.push(StateOp::Set {
                owner: ctx.account,
                key: *key,
                value: entry.value.clone(),
            });
            summary.state_writes.push((*key, Some(entry.value.clone())));
        }
    }

    batch.emitted = ctx.emitted.iter().cloned().collect();
    summary.emitted_count = batch.emitted.len();

    if !batch.is_empty() {
        apply_ctx.apply_batch(batch)?;
    }
    Ok(summary)
}
