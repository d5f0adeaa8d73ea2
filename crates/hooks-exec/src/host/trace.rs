//! Diagnostic sinks. Trace calls never alter ledger state; their events ride the context and
//! are surfaced to the embedder whatever the verdict.

use alloc::string::String;

use super::HostCtx;
use crate::api::{ApiError, HostReturn};
use crate::apply::TraceEvent;
use crate::memory;

impl HostCtx<'_> {
    /// `trace(read_ptr, read_len, as_hex)`: records a guest message, hex-rendered when
    /// `as_hex` is non-zero.
    pub(crate) fn trace(&mut self, read_ptr: u32, read_len: u32, as_hex: u32) -> HostReturn {
        let raw = memory::read(self.mem, read_ptr, read_len)?;
        let message = if as_hex != 0 {
            hex::encode_upper(raw)
        } else {
            String::from_utf8_lossy(raw).into_owned()
        };
        self.ctx.trace_log.push(TraceEvent::Message(message));
        Ok(read_len as i64)
    }

    /// `trace_num(read_ptr, read_len, number)`: records a labelled number.
    pub(crate) fn trace_num(&mut self, read_ptr: u32, read_len: u32, number: i64) -> HostReturn {
        let raw = memory::read(self.mem, read_ptr, read_len)?;
        let label = String::from_utf8_lossy(raw).into_owned();
        self.ctx.trace_log.push(TraceEvent::Number { label, number });
        Ok(read_len as i64)
    }

    /// `trace_slot(slot)`: records the hex image of a slotted object.
    pub(crate) fn trace_slot(&mut self, slot: u32) -> HostReturn {
        if slot == 0 || slot > crate::api::MAX_SLOTS {
            return Err(ApiError::InvalidArgument);
        }
        let entry = match self.ctx.slots.get(&(slot as u8)) {
            Some(slotted) => slotted.entry.clone(),
            None => return Err(ApiError::DoesntExist),
        };
        let data = hex::encode_upper(entry.data());
        let written = entry.data().len() as i64;
        self.ctx.trace_log.push(TraceEvent::Slot { slot, data });
        Ok(written)
    }
}
