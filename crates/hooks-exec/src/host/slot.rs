//! Slot calls: numbered handles onto materialized ledger objects.

use hooks_objects::fields::FieldId;
use hooks_objects::sto::StReader;
use hooks_objects::transaction::field_to_text;
use hooks_objects::{Hash256, Keylet};

use super::HostCtx;
use crate::api::{data_as_int64, ApiError, HostReturn, MAX_SLOTS};
use crate::context::Slot;
use crate::memory;

/// `slot_type` tag: the read region is a raw 32-byte object key.
const SLOT_SRC_OBJECT_KEY: u32 = 0;
/// `slot_type` tag: the read region is a 34-byte serialized keylet.
const SLOT_SRC_KEYLET: u32 = 1;

impl HostCtx<'_> {
    /// `slot_set(read_ptr, read_len, slot_type, slot)`: materializes a ledger object into a
    /// slot and returns the slot id.
    ///
    /// A non-zero `slot` replaces that slot's occupant; zero picks a reclaimed id, then the
    /// counter. Fails NO_FREE_SLOTS past 255 live slots, DOESNT_EXIST when the object cannot
    /// be resolved, INVALID_ARGUMENT on an unknown `slot_type`.
    pub(crate) fn slot_set(
        &mut self,
        read_ptr: u32,
        read_len: u32,
        slot_type: u32,
        slot: i32,
    ) -> HostReturn {
        if !(0..=MAX_SLOTS as i32).contains(&slot) {
            return Err(ApiError::InvalidArgument);
        }

        let raw = memory::read(self.mem, read_ptr, read_len)?;
        let keylet = match slot_type {
            SLOT_SRC_OBJECT_KEY => {
                let key = Hash256::from_slice(raw).ok_or(ApiError::InvalidArgument)?;
                Keylet::generic(key)
            },
            SLOT_SRC_KEYLET => Keylet::from_bytes(raw).ok_or(ApiError::InvalidArgument)?,
            _ => return Err(ApiError::InvalidArgument),
        };

        let entry = self.view.read_object(&keylet).ok_or(ApiError::DoesntExist)?;
        let id = self.ctx.next_slot_id(slot as u32).ok_or(ApiError::NoFreeSlots)?;
        self.ctx.slots.insert(id, Slot { entry });
        Ok(id as i64)
    }

    /// `slot_clear(slot)`: drops the slot and reclaims its id.
    pub(crate) fn slot_clear(&mut self, slot: u32) -> HostReturn {
        let id = self.checked_slot_id(slot)?;
        if self.ctx.slots.remove(&id).is_none() {
            return Err(ApiError::DoesntExist);
        }
        self.ctx.slot_free.push_back(id);
        Ok(1)
    }

    /// `slot_field(write_ptr, write_len, field_id, slot)`: serializes one field of the slotted
    /// object, header included, into the write region.
    pub(crate) fn slot_field(
        &mut self,
        write_ptr: u32,
        write_len: u32,
        field_id: u32,
        slot: u32,
    ) -> HostReturn {
        let field = FieldId::from_u32(field_id).ok_or(ApiError::InvalidField)?;
        let id = self.checked_slot_id(slot)?;
        let entry = self.ctx.slots.get(&id).ok_or(ApiError::DoesntExist)?.entry.clone();

        let reader = StReader::new(entry.data());
        let found = reader.find(field).map_err(|_| ApiError::InternalError)?;
        let found = found.ok_or(ApiError::InvalidField)?;
        let bytes = reader.full(&found).to_vec();
        memory::write(self.mem, write_ptr, write_len, &bytes)
    }

    /// `slot_field_txt`: as `slot_field`, in the text rendition.
    pub(crate) fn slot_field_txt(
        &mut self,
        write_ptr: u32,
        write_len: u32,
        field_id: u32,
        slot: u32,
    ) -> HostReturn {
        let field = FieldId::from_u32(field_id).ok_or(ApiError::InvalidField)?;
        let id = self.checked_slot_id(slot)?;
        let entry = self.ctx.slots.get(&id).ok_or(ApiError::DoesntExist)?.entry.clone();

        let reader = StReader::new(entry.data());
        let found = reader.find(field).map_err(|_| ApiError::InternalError)?;
        let found = found.ok_or(ApiError::InvalidField)?;
        let text =
            field_to_text(field, reader.payload(&found)).ok_or(ApiError::InternalError)?;
        memory::write(self.mem, write_ptr, write_len, text.as_bytes())
    }

    /// `slot_id(slot)`: the 64-bit big-endian prefix of the slotted object's key.
    pub(crate) fn slot_id(&mut self, slot: u32) -> HostReturn {
        let id = self.checked_slot_id(slot)?;
        let slot = self.ctx.slots.get(&id).ok_or(ApiError::DoesntExist)?;
        data_as_int64(&slot.keylet().key.as_bytes()[..8])
    }

    /// `slot_type(slot)`: the keylet space tag of the slotted object.
    pub(crate) fn slot_type(&mut self, slot: u32) -> HostReturn {
        let id = self.checked_slot_id(slot)?;
        let slot = self.ctx.slots.get(&id).ok_or(ApiError::DoesntExist)?;
        Ok(slot.keylet().space as i64)
    }

    /// Rejects slot numbers outside [1, 255].
    fn checked_slot_id(&self, slot: u32) -> Result<u8, ApiError> {
        if slot == 0 || slot > MAX_SLOTS {
            return Err(ApiError::InvalidArgument);
        }
        Ok(slot as u8)
    }
}
