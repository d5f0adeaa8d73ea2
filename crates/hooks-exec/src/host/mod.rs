//! The host-function layer: every call a guest may make, bound over the execution context.
//!
//! Each call body is a method on [`HostCtx`], an exclusive view over the context, the ledger
//! snapshot and the guest's linear memory. The bodies are registered twice: under their import
//! names with their exact wasm signatures, and in [`API_TABLE`] behind the trampoline `_`,
//! which dispatches by the CRC32 of the name with six generic arguments.

use alloc::sync::Arc;
use core::fmt;

use wasmi::core::HostError;
use wasmi::{AsContextMut, Caller, Linker};

use hooks_objects::transaction::Transaction;

use crate::api::{api_number, flatten, ApiError, HostReturn};
use crate::apply::LedgerView;
use crate::context::ExecutionContext;

mod control;
mod etxn;
mod otxn;
mod slot;
mod state;
mod trace;
mod util;

// HOST STATE
// ================================================================================================

/// The data stored inside the VM store for one invocation.
pub struct HostState {
    pub(crate) ctx: ExecutionContext,
    pub(crate) view: Arc<dyn LedgerView>,
    /// Set by the binder once the instance's memory is resolved; host calls before that point
    /// cannot happen because modules with start sections are rejected.
    pub(crate) memory: Option<wasmi::Memory>,
}

impl HostState {
    pub fn new(ctx: ExecutionContext, view: Arc<dyn LedgerView>) -> Self {
        Self { ctx, view, memory: None }
    }

    pub fn into_context(self) -> ExecutionContext {
        self.ctx
    }
}

// HOST CALL VIEW
// ================================================================================================

/// Everything one host call may observe and mutate.
pub(crate) struct HostCtx<'a> {
    pub ctx: &'a mut ExecutionContext,
    pub view: &'a dyn LedgerView,
    pub mem: &'a mut [u8],
}

impl HostCtx<'_> {
    /// The triggering transaction.
    pub fn otxn(&self) -> Arc<Transaction> {
        self.ctx.otxn.clone()
    }
}

// UNWIND MARKER
// ================================================================================================

/// Host error that unwinds the VM after `accept`, `rollback` or a guard violation.
///
/// The verdict is always recorded on the context before this is raised; the runner treats an
/// execution error on a context with a terminal verdict as a host-initiated unwind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookUnwind;

impl fmt::Display for HookUnwind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("hook terminated by host")
    }
}

impl HostError for HookUnwind {}

/// Result of a host call that may terminate the guest.
pub(crate) type CallResult = Result<i64, HookUnwind>;

// CLOSURE GLUE
// ================================================================================================

/// Resolves the linear memory and the split borrows of the store data, then runs one call body.
fn call(
    caller: &mut Caller<'_, HostState>,
    body: impl FnOnce(&mut HostCtx<'_>) -> CallResult,
) -> Result<i64, wasmi::Error> {
    let Some(memory) = caller.data().memory else {
        return Ok(ApiError::InternalError.code());
    };
    let (mem, state) = memory.data_and_store_mut(caller.as_context_mut());
    let HostState { ctx, view, .. } = state;
    let mut host = HostCtx { ctx, view: view.as_ref(), mem };
    match body(&mut host) {
        Ok(value) => Ok(value),
        Err(unwind) => Err(wasmi::Error::host(unwind)),
    }
}

/// Like [`call`], for bodies that cannot terminate the guest.
fn call_api(
    caller: &mut Caller<'_, HostState>,
    body: impl FnOnce(&mut HostCtx<'_>) -> HostReturn,
) -> Result<i64, wasmi::Error> {
    call(caller, |host| Ok(flatten(body(host))))
}

// API TABLE
// ================================================================================================

type ApiFn = fn(&mut HostCtx<'_>, [u64; 6]) -> CallResult;

/// Flattens an API-channel body into the trampoline signature.
macro_rules! api {
    (|$h:ident, $a:ident| $body:expr) => {
        |$h: &mut HostCtx<'_>, $a: [u64; 6]| -> CallResult { Ok(flatten($body)) }
    };
}

/// Every host call, dispatchable by the CRC32 of its name.
///
/// The table is a superset of the import whitelist: calls absent from the whitelist are
/// reachable through the trampoline only.
pub(crate) const API_TABLE: &[(&str, ApiFn)] = &[
    ("_g", |h, a| h.guard(a[0] as u32, a[1] as u32).map(i64::from)),
    ("accept", |h, a| h.accept(a[0] as u32, a[1] as u32, a[2] as i64)),
    ("rollback", |h, a| h.rollback(a[0] as u32, a[1] as u32, a[2] as i64)),
    ("util_raddr", api!(|h, a| h.util_raddr(a[0] as u32, a[1] as u32, a[2] as u32, a[3] as u32))),
    ("util_accid", api!(|h, a| h.util_accid(a[0] as u32, a[1] as u32, a[2] as u32, a[3] as u32))),
    (
        "util_verify",
        api!(|h, a| h.util_verify(
            a[0] as u32,
            a[1] as u32,
            a[2] as u32,
            a[3] as u32,
            a[4] as u32,
            a[5] as u32
        )),
    ),
    ("util_verify_sto", api!(|h, a| h.util_verify_sto(a[0] as u32, a[1] as u32))),
    (
        "util_sha512h",
        api!(|h, a| h.util_sha512h(a[0] as u32, a[1] as u32, a[2] as u32, a[3] as u32)),
    ),
    ("util_subfield", api!(|h, a| h.util_subfield(a[0] as u32, a[1] as u32, a[2] as u32))),
    ("util_subarray", api!(|h, a| h.util_subarray(a[0] as u32, a[1] as u32, a[2] as u32))),
    ("etxn_burden", api!(|h, _a| h.etxn_burden())),
    ("etxn_details", api!(|h, a| h.etxn_details(a[0] as u32, a[1] as u32))),
    ("etxn_fee_base", api!(|h, a| h.etxn_fee_base(a[0] as u32))),
    ("etxn_reserve", api!(|h, a| h.etxn_reserve(a[0] as u32))),
    ("etxn_generation", api!(|h, _a| h.etxn_generation())),
    ("emit", api!(|h, a| h.emit(a[0] as u32, a[1] as u32))),
    ("hook_account", api!(|h, a| h.hook_account(a[0] as u32, a[1] as u32))),
    ("hook_hash", api!(|h, a| h.hook_hash(a[0] as u32, a[1] as u32))),
    ("fee_base", api!(|h, _a| h.fee_base())),
    ("ledger_seq", api!(|h, _a| h.ledger_seq())),
    ("nonce", api!(|h, a| h.nonce(a[0] as u32, a[1] as u32))),
    ("slot_clear", api!(|h, a| h.slot_clear(a[0] as u32))),
    ("slot_set", api!(|h, a| h.slot_set(a[0] as u32, a[1] as u32, a[2] as u32, a[3] as i32))),
    (
        "slot_field_txt",
        api!(|h, a| h.slot_field_txt(a[0] as u32, a[1] as u32, a[2] as u32, a[3] as u32)),
    ),
    (
        "slot_field",
        api!(|h, a| h.slot_field(a[0] as u32, a[1] as u32, a[2] as u32, a[3] as u32)),
    ),
    ("slot_id", api!(|h, a| h.slot_id(a[0] as u32))),
    ("slot_type", api!(|h, a| h.slot_type(a[0] as u32))),
    ("state_set", api!(|h, a| h.state_set(a[0] as u32, a[1] as u32, a[2] as u32, a[3] as u32))),
    ("state", api!(|h, a| h.state(a[0] as u32, a[1] as u32, a[2] as u32, a[3] as u32))),
    (
        "state_foreign",
        api!(|h, a| h.state_foreign(
            a[0] as u32,
            a[1] as u32,
            a[2] as u32,
            a[3] as u32,
            a[4] as u32,
            a[5] as u32
        )),
    ),
    ("trace_slot", api!(|h, a| h.trace_slot(a[0] as u32))),
    ("trace", api!(|h, a| h.trace(a[0] as u32, a[1] as u32, a[2] as u32))),
    ("trace_num", api!(|h, a| h.trace_num(a[0] as u32, a[1] as u32, a[2] as i64))),
    ("otxn_burden", api!(|h, _a| h.otxn_burden())),
    ("otxn_field", api!(|h, a| h.otxn_field(a[0] as u32, a[1] as u32, a[2] as u32))),
    ("otxn_field_txt", api!(|h, a| h.otxn_field_txt(a[0] as u32, a[1] as u32, a[2] as u32))),
    ("otxn_generation", api!(|h, _a| h.otxn_generation())),
    ("otxn_id", api!(|h, a| h.otxn_id(a[0] as u32, a[1] as u32))),
    ("otxn_type", api!(|h, _a| h.otxn_type())),
];

impl HostCtx<'_> {
    /// The trampoline `_`: dispatches by API number with six generic arguments.
    pub(crate) fn trampoline(&mut self, api_no: u32, args: [u64; 6]) -> CallResult {
        for (name, func) in API_TABLE {
            if api_number(name) == api_no {
                return func(self, args);
            }
        }
        Ok(ApiError::InvalidArgument.code())
    }
}

// LINKER REGISTRATION
// ================================================================================================

/// Defines every host function on the linker under the `env` namespace with its exact wasm
/// signature.
pub(crate) fn register(
    linker: &mut Linker<HostState>,
) -> Result<(), wasmi::errors::LinkerError> {
    linker.func_wrap(
        "env",
        "_",
        |mut c: Caller<'_, HostState>, n: u32, a: u32, b: u32, x: u32, d: u32, e: u32, f: u32| {
            call(&mut c, |h| {
                h.trampoline(n, [a as u64, b as u64, x as u64, d as u64, e as u64, f as u64])
            })
        },
    )?;
    linker.func_wrap("env", "_g", |mut c: Caller<'_, HostState>, id: u32, maxiter: u32| {
        match call(&mut c, |h| h.guard(id, maxiter).map(i64::from)) {
            Ok(value) => Ok(value as i32),
            Err(error) => Err(error),
        }
    })?;
    linker.func_wrap(
        "env",
        "accept",
        |mut c: Caller<'_, HostState>, ptr: u32, len: u32, code: i64| {
            call(&mut c, |h| h.accept(ptr, len, code))
        },
    )?;
    linker.func_wrap(
        "env",
        "rollback",
        |mut c: Caller<'_, HostState>, ptr: u32, len: u32, code: i64| {
            call(&mut c, |h| h.rollback(ptr, len, code))
        },
    )?;
    linker.func_wrap(
        "env",
        "util_raddr",
        |mut c: Caller<'_, HostState>, w: u32, wl: u32, r: u32, rl: u32| {
            call_api(&mut c, |h| h.util_raddr(w, wl, r, rl))
        },
    )?;
    linker.func_wrap(
        "env",
        "util_accid",
        |mut c: Caller<'_, HostState>, w: u32, wl: u32, r: u32, rl: u32| {
            call_api(&mut c, |h| h.util_accid(w, wl, r, rl))
        },
    )?;
    linker.func_wrap(
        "env",
        "util_verify",
        |mut c: Caller<'_, HostState>, d: u32, dl: u32, s: u32, sl: u32, k: u32, kl: u32| {
            call_api(&mut c, |h| h.util_verify(d, dl, s, sl, k, kl))
        },
    )?;
    linker.func_wrap(
        "env",
        "util_verify_sto",
        |mut c: Caller<'_, HostState>, t: u32, tl: u32| {
            call_api(&mut c, |h| h.util_verify_sto(t, tl))
        },
    )?;
    linker.func_wrap(
        "env",
        "util_sha512h",
        |mut c: Caller<'_, HostState>, w: u32, wl: u32, r: u32, rl: u32| {
            call_api(&mut c, |h| h.util_sha512h(w, wl, r, rl))
        },
    )?;
    linker.func_wrap(
        "env",
        "util_subfield",
        |mut c: Caller<'_, HostState>, r: u32, rl: u32, field: u32| {
            call_api(&mut c, |h| h.util_subfield(r, rl, field))
        },
    )?;
    linker.func_wrap(
        "env",
        "util_subarray",
        |mut c: Caller<'_, HostState>, r: u32, rl: u32, index: u32| {
            call_api(&mut c, |h| h.util_subarray(r, rl, index))
        },
    )?;
    linker.func_wrap("env", "etxn_burden", |mut c: Caller<'_, HostState>| {
        call_api(&mut c, |h| h.etxn_burden())
    })?;
    linker.func_wrap("env", "etxn_details", |mut c: Caller<'_, HostState>, w: u32, wl: u32| {
        call_api(&mut c, |h| h.etxn_details(w, wl))
    })?;
    linker.func_wrap("env", "etxn_fee_base", |mut c: Caller<'_, HostState>, count: u32| {
        call_api(&mut c, |h| h.etxn_fee_base(count))
    })?;
    linker.func_wrap("env", "etxn_reserve", |mut c: Caller<'_, HostState>, count: u32| {
        call_api(&mut c, |h| h.etxn_reserve(count))
    })?;
    linker.func_wrap("env", "etxn_generation", |mut c: Caller<'_, HostState>| {
        call_api(&mut c, |h| h.etxn_generation())
    })?;
    linker.func_wrap("env", "emit", |mut c: Caller<'_, HostState>, r: u32, rl: u32| {
        call_api(&mut c, |h| h.emit(r, rl))
    })?;
    linker.func_wrap("env", "hook_account", |mut c: Caller<'_, HostState>, w: u32, wl: u32| {
        call_api(&mut c, |h| h.hook_account(w, wl))
    })?;
    linker.func_wrap("env", "hook_hash", |mut c: Caller<'_, HostState>, w: u32, wl: u32| {
        call_api(&mut c, |h| h.hook_hash(w, wl))
    })?;
    linker.func_wrap("env", "fee_base", |mut c: Caller<'_, HostState>| {
        call_api(&mut c, |h| h.fee_base())
    })?;
    linker.func_wrap("env", "ledger_seq", |mut c: Caller<'_, HostState>| {
        call_api(&mut c, |h| h.ledger_seq())
    })?;
    linker.func_wrap("env", "nonce", |mut c: Caller<'_, HostState>, w: u32, wl: u32| {
        call_api(&mut c, |h| h.nonce(w, wl))
    })?;
    linker.func_wrap("env", "slot_clear", |mut c: Caller<'_, HostState>, slot: u32| {
        call_api(&mut c, |h| h.slot_clear(slot))
    })?;
    linker.func_wrap(
        "env",
        "slot_set",
        |mut c: Caller<'_, HostState>, r: u32, rl: u32, ty: u32, slot: i32| {
            call_api(&mut c, |h| h.slot_set(r, rl, ty, slot))
        },
    )?;
    linker.func_wrap(
        "env",
        "slot_field_txt",
        |mut c: Caller<'_, HostState>, w: u32, wl: u32, field: u32, slot: u32| {
            call_api(&mut c, |h| h.slot_field_txt(w, wl, field, slot))
        },
    )?;
    linker.func_wrap(
        "env",
        "slot_field",
        |mut c: Caller<'_, HostState>, w: u32, wl: u32, field: u32, slot: u32| {
            call_api(&mut c, |h| h.slot_field(w, wl, field, slot))
        },
    )?;
    linker.func_wrap("env", "slot_id", |mut c: Caller<'_, HostState>, slot: u32| {
        call_api(&mut c, |h| h.slot_id(slot))
    })?;
    linker.func_wrap("env", "slot_type", |mut c: Caller<'_, HostState>, slot: u32| {
        call_api(&mut c, |h| h.slot_type(slot))
    })?;
    linker.func_wrap(
        "env",
        "state_set",
        |mut c: Caller<'_, HostState>, r: u32, rl: u32, k: u32, kl: u32| {
            call_api(&mut c, |h| h.state_set(r, rl, k, kl))
        },
    )?;
    linker.func_wrap(
        "env",
        "state",
        |mut c: Caller<'_, HostState>, w: u32, wl: u32, k: u32, kl: u32| {
            call_api(&mut c, |h| h.state(w, wl, k, kl))
        },
    )?;
    linker.func_wrap(
        "env",
        "state_foreign",
        |mut c: Caller<'_, HostState>, w: u32, wl: u32, k: u32, kl: u32, a: u32, al: u32| {
            call_api(&mut c, |h| h.state_foreign(w, wl, k, kl, a, al))
        },
    )?;
    linker.func_wrap("env", "trace_slot", |mut c: Caller<'_, HostState>, slot: u32| {
        call_api(&mut c, |h| h.trace_slot(slot))
    })?;
    linker.func_wrap(
        "env",
        "trace",
        |mut c: Caller<'_, HostState>, r: u32, rl: u32, as_hex: u32| {
            call_api(&mut c, |h| h.trace(r, rl, as_hex))
        },
    )?;
    linker.func_wrap(
        "env",
        "trace_num",
        |mut c: Caller<'_, HostState>, r: u32, rl: u32, number: i64| {
            call_api(&mut c, |h| h.trace_num(r, rl, number))
        },
    )?;
    linker.func_wrap("env", "otxn_burden", |mut c: Caller<'_, HostState>| {
        call_api(&mut c, |h| h.otxn_burden())
    })?;
    linker.func_wrap(
        "env",
        "otxn_field",
        |mut c: Caller<'_, HostState>, w: u32, wl: u32, field: u32| {
            call_api(&mut c, |h| h.otxn_field(w, wl, field))
        },
    )?;
    linker.func_wrap(
        "env",
        "otxn_field_txt",
        |mut c: Caller<'_, HostState>, w: u32, wl: u32, field: u32| {
            call_api(&mut c, |h| h.otxn_field_txt(w, wl, field))
        },
    )?;
    linker.func_wrap("env", "otxn_generation", |mut c: Caller<'_, HostState>| {
        call_api(&mut c, |h| h.otxn_generation())
    })?;
    linker.func_wrap("env", "otxn_id", |mut c: Caller<'_, HostState>, w: u32, wl: u32| {
        call_api(&mut c, |h| h.otxn_id(w, wl))
    })?;
    linker.func_wrap("env", "otxn_type", |mut c: Caller<'_, HostState>| {
        call_api(&mut c, |h| h.otxn_type())
    })?;
    Ok(())
}

// TESTS
// ================================================================================================
