//! State calls: the `(account, key)`-addressed blob store.

use alloc::vec::Vec;

use hooks_objects::{AccountId, Hash256};

use super::HostCtx;
use crate::api::{ApiError, HostReturn};
use crate::context::StateEntry;
use crate::memory;

impl HostCtx<'_> {
    /// `state_set(read_ptr, read_len, kread_ptr, kread_len)`: stages a write to the hook
    /// account's state under the given key. An empty value stages a deletion. Staged values
    /// are visible to subsequent reads and written back only on accept.
    pub(crate) fn state_set(
        &mut self,
        read_ptr: u32,
        read_len: u32,
        kread_ptr: u32,
        kread_len: u32,
    ) -> HostReturn {
        let key = self.read_state_key(kread_ptr, kread_len)?;
        if read_len as usize > self.ctx.limits.max_state_entry_size {
            return Err(ApiError::TooBig);
        }
        let value = memory::read(self.mem, read_ptr, read_len)?.to_vec();
        let written = value.len() as i64;
        self.ctx.changed_state.insert(key, StateEntry { dirty: true, value });
        Ok(written)
    }

    /// `state(write_ptr, write_len, kread_ptr, kread_len)`: reads the hook account's state
    /// entry under the given key, staged writes first.
    pub(crate) fn state(
        &mut self,
        write_ptr: u32,
        write_len: u32,
        kread_ptr: u32,
        kread_len: u32,
    ) -> HostReturn {
        let key = self.read_state_key(kread_ptr, kread_len)?;
        let value = self.own_state_value(key)?;
        memory::write(self.mem, write_ptr, write_len, &value)
    }

    /// `state_foreign(write_ptr, write_len, kread_ptr, kread_len, aread_ptr, aread_len)`:
    /// reads another account's state entry. Reads of the hook's own account see staged writes;
    /// foreign accounts are read from the snapshot only. Foreign writes do not exist.
    pub(crate) fn state_foreign(
        &mut self,
        write_ptr: u32,
        write_len: u32,
        kread_ptr: u32,
        kread_len: u32,
        aread_ptr: u32,
        aread_len: u32,
    ) -> HostReturn {
        let key = self.read_state_key(kread_ptr, kread_len)?;
        let raw = memory::read(self.mem, aread_ptr, aread_len)?;
        let owner = AccountId::from_slice(raw).map_err(|_| ApiError::InvalidAccount)?;

        let value = if owner == self.ctx.account {
            self.own_state_value(key)?
        } else {
            self.view.read_state(owner, key).ok_or(ApiError::DoesntExist)?
        };
        memory::write(self.mem, write_ptr, write_len, &value)
    }

    // HELPERS
    // --------------------------------------------------------------------------------------------

    /// Reads a state key of 1 to 32 bytes and left-pads it to 256 bits.
    fn read_state_key(&mut self, kread_ptr: u32, kread_len: u32) -> Result<Hash256, ApiError> {
        if kread_len == 0 {
            return Err(ApiError::TooSmall);
        }
        if kread_len > 32 {
            return Err(ApiError::TooBig);
        }
        let raw = memory::read(self.mem, kread_ptr, kread_len)?;
        let mut key = [0u8; 32];
        key[32 - raw.len()..].copy_from_slice(raw);
        Ok(Hash256::new(key))
    }

    /// The hook account's value for `key`: the pending entry if one exists, otherwise the
    /// snapshot value, cached as a clean entry for later reads.
    fn own_state_value(&mut self, key: Hash256) -> Result<Vec<u8>, ApiError> {
        if let Some(entry) = self.ctx.changed_state.get(&key) {
            // A staged empty value is a pending deletion.
            if entry.dirty && entry.value.is_empty() {
                return Err(ApiError::DoesntExist);
            }
            return Ok(entry.value.clone());
        }
        let account = self.ctx.account;
        let value = self.view.read_state(account, key).ok_or(ApiError::DoesntExist)?;
        self.ctx
            .changed_state
            .insert(key, StateEntry { dirty: false, value: value.clone() });
        Ok(value)
    }
}
