//! Terminal calls and the iteration guard.

use super::{CallResult, HookUnwind, HostCtx};
use crate::api::ApiError;
use crate::context::Verdict;
use crate::memory;

impl HostCtx<'_> {
    /// `accept(read_ptr, read_len, error_code)`: records an ACCEPT verdict with the guest's
    /// diagnostic payload and unwinds the VM. Does not return to the guest.
    pub(crate) fn accept(&mut self, read_ptr: u32, read_len: u32, error_code: i64) -> CallResult {
        self.terminate(Verdict::Accept, read_ptr, read_len, error_code)
    }

    /// `rollback(read_ptr, read_len, error_code)`: as `accept`, with a ROLLBACK verdict.
    pub(crate) fn rollback(&mut self, read_ptr: u32, read_len: u32, error_code: i64) -> CallResult {
        self.terminate(Verdict::Rollback, read_ptr, read_len, error_code)
    }

    /// `_g(guard_id, maxiter)`: bumps the guard counter for `guard_id`; exceeding `maxiter`
    /// records a WASM_ERROR verdict with GUARD_VIOLATION and unwinds.
    pub(crate) fn guard(&mut self, guard_id: u32, maxiter: u32) -> Result<i32, HookUnwind> {
        let count = self.ctx.guard_map.entry(guard_id).or_insert(0);
        *count = count.saturating_add(1);
        if *count > maxiter {
            self.ctx.finish(
                Verdict::WasmError,
                b"guard violation",
                ApiError::GuardViolation.code(),
            );
            return Err(HookUnwind);
        }
        Ok(1)
    }

    fn terminate(
        &mut self,
        verdict: Verdict,
        read_ptr: u32,
        read_len: u32,
        error_code: i64,
    ) -> CallResult {
        let reason = match memory::read(self.mem, read_ptr, read_len) {
            Ok(reason) => reason.to_vec(),
            Err(error) => return Ok(error.code()),
        };
        self.ctx.finish(verdict, &reason, error_code);
        Err(HookUnwind)
    }
}
