//! Pure utility calls: address conversion, hashing, signature checks and serialized-object
//! traversal.

use libsecp256k1::{Message, PublicKey, Signature};

use hooks_objects::fields::FieldId;
use hooks_objects::sto::{self, StReader};
use hooks_objects::{sha512h, AccountId};

use super::HostCtx;
use crate::api::{ApiError, HostReturn};
use crate::memory;

impl HostCtx<'_> {
    /// `util_raddr`: renders a 20-byte account id as its base58-check address.
    pub(crate) fn util_raddr(
        &mut self,
        write_ptr: u32,
        write_len: u32,
        read_ptr: u32,
        read_len: u32,
    ) -> HostReturn {
        let raw = memory::read(self.mem, read_ptr, read_len)?;
        let account = AccountId::from_slice(raw).map_err(|_| ApiError::InvalidAccount)?;
        let address = account.to_address();
        memory::write(self.mem, write_ptr, write_len, address.as_bytes())
    }

    /// `util_accid`: decodes a base58-check address into a 20-byte account id.
    pub(crate) fn util_accid(
        &mut self,
        write_ptr: u32,
        write_len: u32,
        read_ptr: u32,
        read_len: u32,
    ) -> HostReturn {
        let raw = memory::read(self.mem, read_ptr, read_len)?;
        let address = core::str::from_utf8(raw).map_err(|_| ApiError::InvalidAccount)?;
        let account =
            AccountId::from_address(address).map_err(|_| ApiError::InvalidAccount)?;
        memory::write(self.mem, write_ptr, write_len, account.as_ref())
    }

    /// `util_verify(data, sig, pubkey)`: 1 when the 64-byte compact secp256k1 signature over
    /// `sha512h(data)` verifies, 0 when it does not, negative on unusable arguments.
    pub(crate) fn util_verify(
        &mut self,
        dread_ptr: u32,
        dread_len: u32,
        sread_ptr: u32,
        sread_len: u32,
        kread_ptr: u32,
        kread_len: u32,
    ) -> HostReturn {
        if dread_len == 0 || sread_len == 0 || kread_len == 0 {
            return Err(ApiError::TooSmall);
        }
        let data = memory::read(self.mem, dread_ptr, dread_len)?;
        let digest = sha512h(data);

        let key_raw = memory::read(self.mem, kread_ptr, kread_len)?;
        let key =
            PublicKey::parse_slice(key_raw, None).map_err(|_| ApiError::InvalidArgument)?;

        let sig_raw = memory::read(self.mem, sread_ptr, sread_len)?;
        let fixed: [u8; 64] = sig_raw.try_into().map_err(|_| ApiError::InvalidArgument)?;
        let signature =
            Signature::parse_standard(&fixed).map_err(|_| ApiError::InvalidArgument)?;

        let message = Message::parse(digest.as_bytes());
        Ok(libsecp256k1::verify(&message, &signature, &key) as i64)
    }

    /// `util_verify_sto`: 1 when the read region parses as a well-formed serialized object,
    /// 0 otherwise.
    pub(crate) fn util_verify_sto(&mut self, tread_ptr: u32, tread_len: u32) -> HostReturn {
        let raw = memory::read(self.mem, tread_ptr, tread_len)?;
        Ok(StReader::new(raw).validate().is_ok() as i64)
    }

    /// `util_sha512h`: writes the 32-byte SHA-512-half of the read region.
    pub(crate) fn util_sha512h(
        &mut self,
        write_ptr: u32,
        write_len: u32,
        read_ptr: u32,
        read_len: u32,
    ) -> HostReturn {
        let data = memory::read(self.mem, read_ptr, read_len)?;
        let digest = sha512h(data);
        memory::write(self.mem, write_ptr, write_len, digest.as_ref())
    }

    /// `util_subfield`: locates a field inside a serialized object; the result packs the
    /// offset into the high 32 bits and the length into the low 32.
    pub(crate) fn util_subfield(
        &mut self,
        read_ptr: u32,
        read_len: u32,
        field_id: u32,
    ) -> HostReturn {
        let field = FieldId::from_u32(field_id).ok_or(ApiError::InvalidField)?;
        let raw = memory::read(self.mem, read_ptr, read_len)?;
        match sto::subfield(raw, field).map_err(|_| ApiError::ParseError)? {
            Some((offset, len)) => Ok(pack_span(offset, len)),
            None => Err(ApiError::DoesntExist),
        }
    }

    /// `util_subarray`: locates the `array_index`-th element of a serialized array; packed as
    /// in `util_subfield`.
    pub(crate) fn util_subarray(
        &mut self,
        read_ptr: u32,
        read_len: u32,
        array_index: u32,
    ) -> HostReturn {
        let raw = memory::read(self.mem, read_ptr, read_len)?;
        match sto::subarray(raw, array_index).map_err(|_| ApiError::ParseError)? {
            Some((offset, len)) => Ok(pack_span(offset, len)),
            None => Err(ApiError::DoesntExist),
        }
    }

    /// `hook_account`: writes the 20-byte id of the account the hook runs on.
    pub(crate) fn hook_account(&mut self, write_ptr: u32, write_len: u32) -> HostReturn {
        let account = self.ctx.account;
        memory::write(self.mem, write_ptr, write_len, account.as_ref())
    }

    /// `hook_hash`: writes the 32-byte hash of the running hook's bytecode.
    pub(crate) fn hook_hash(&mut self, write_ptr: u32, write_len: u32) -> HostReturn {
        let hash = self.ctx.hook_hash;
        memory::write(self.mem, write_ptr, write_len, hash.as_ref())
    }

    /// `fee_base`: the ledger's minimum fee unit, memoized from the snapshot.
    pub(crate) fn fee_base(&mut self) -> HostReturn {
        Ok(self.cached_fee_base() as i64)
    }

    /// `ledger_seq`: the sequence number of the ledger being built.
    pub(crate) fn ledger_seq(&mut self) -> HostReturn {
        Ok(self.view.ledger_seq() as i64)
    }
}

/// Packs a sub-object span into the success channel: offset high, length low. Spans are within
/// a 64 KiB memory, so the high bit can never be set.
fn pack_span(offset: usize, len: usize) -> i64 {
    ((offset as i64) << 32) | len as i64
}
