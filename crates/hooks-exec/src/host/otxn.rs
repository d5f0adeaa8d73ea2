//! Calls observing the triggering transaction.

use hooks_objects::fields::FieldId;
use hooks_objects::transaction::field_to_text;

use super::HostCtx;
use crate::api::{ApiError, HostReturn};
use crate::memory;

impl HostCtx<'_> {
    /// `otxn_field(write_ptr, write_len, field_id)`: the canonical payload of one field of the
    /// triggering transaction.
    pub(crate) fn otxn_field(
        &mut self,
        write_ptr: u32,
        write_len: u32,
        field_id: u32,
    ) -> HostReturn {
        let field = FieldId::from_u32(field_id).ok_or(ApiError::InvalidField)?;
        let otxn = self.otxn();
        let payload = otxn.field(field).ok_or(ApiError::DoesntExist)?;
        memory::write(self.mem, write_ptr, write_len, payload)
    }

    /// `otxn_field_txt`: as `otxn_field`, in the text rendition.
    pub(crate) fn otxn_field_txt(
        &mut self,
        write_ptr: u32,
        write_len: u32,
        field_id: u32,
    ) -> HostReturn {
        let field = FieldId::from_u32(field_id).ok_or(ApiError::InvalidField)?;
        let otxn = self.otxn();
        let payload = otxn.field(field).ok_or(ApiError::DoesntExist)?;
        let text = field_to_text(field, payload).ok_or(ApiError::InternalError)?;
        memory::write(self.mem, write_ptr, write_len, text.as_bytes())
    }

    /// `otxn_id(write_ptr, write_len)`: the 32-byte id of the triggering transaction.
    pub(crate) fn otxn_id(&mut self, write_ptr: u32, write_len: u32) -> HostReturn {
        let id = self.ctx.otxn.id();
        memory::write(self.mem, write_ptr, write_len, id.as_ref())
    }

    /// `otxn_type`: the wire value of the triggering transaction's type.
    pub(crate) fn otxn_type(&mut self) -> HostReturn {
        Ok(self.ctx.otxn.tx_type() as i64)
    }

    /// `otxn_burden`: the triggering transaction's burden, memoized on first use.
    pub(crate) fn otxn_burden(&mut self) -> HostReturn {
        i64::try_from(self.cached_burden()).map_err(|_| ApiError::TooBig)
    }

    /// `otxn_generation`: the triggering transaction's generation, memoized on first use.
    pub(crate) fn otxn_generation(&mut self) -> HostReturn {
        Ok(self.cached_generation() as i64)
    }
}
