//! Emission calls: reserving, pricing, stamping and queueing child transactions.

use hooks_objects::hook::validate_inner_objects;
use hooks_objects::sto::insert_field;
use hooks_objects::transaction::{EmitDetails, Transaction};
use hooks_objects::{fields, sha512h_parts, Hash256};

use super::HostCtx;
use crate::api::{
    emission_fee_floor, ApiError, HostReturn, MAX_EMITTED, MAX_EMIT_FEE, MAX_NONCES,
};
use crate::memory;

impl HostCtx<'_> {
    /// `etxn_reserve(count)`: declares the upper bound on emitted transactions. Settable
    /// exactly once; capped at 255.
    pub(crate) fn etxn_reserve(&mut self, count: u32) -> HostReturn {
        if self.ctx.expected_etxn_count >= 0 {
            return Err(ApiError::AlreadySet);
        }
        if count == 0 {
            return Err(ApiError::TooSmall);
        }
        if count > MAX_EMITTED {
            return Err(ApiError::TooBig);
        }
        self.ctx.expected_etxn_count = count as i64;
        Ok(count as i64)
    }

    /// `etxn_fee_base(tx_byte_count)`: the minimum fee for emitting that many bytes.
    pub(crate) fn etxn_fee_base(&mut self, tx_byte_count: u32) -> HostReturn {
        let base = self.cached_fee_base();
        let fee = emission_fee_floor(tx_byte_count as u64, base)?;
        i64::try_from(fee).map_err(|_| ApiError::FeeTooLarge)
    }

    /// `etxn_burden`: the burden every transaction emitted here will carry: the triggering
    /// burden multiplied by the declared reserve.
    pub(crate) fn etxn_burden(&mut self) -> HostReturn {
        let burden = self.emission_burden()?;
        i64::try_from(burden).map_err(|_| ApiError::TooBig)
    }

    /// `etxn_generation`: one past the triggering transaction's generation.
    pub(crate) fn etxn_generation(&mut self) -> HostReturn {
        Ok(self.cached_generation() as i64 + 1)
    }

    /// `etxn_details(write_ptr, write_len)`: writes the emission-details group an emitted
    /// transaction will be stamped with. Consumes one nonce per call.
    pub(crate) fn etxn_details(&mut self, write_ptr: u32, write_len: u32) -> HostReturn {
        let details = self.build_emit_details()?;
        let bytes = details.to_field_bytes();
        debug_assert_eq!(bytes.len(), EmitDetails::SIZE);
        memory::write(self.mem, write_ptr, write_len, &bytes)
    }

    /// `emit(read_ptr, read_len)`: parses the read region as a transaction template, stamps it
    /// with emission details and queues it. The queue is released to the ledger only on
    /// accept.
    pub(crate) fn emit(&mut self, read_ptr: u32, read_len: u32) -> HostReturn {
        if self.ctx.expected_etxn_count < 0 {
            return Err(ApiError::PrerequisiteNotMet);
        }
        if self.ctx.emitted.len() as i64 >= self.ctx.expected_etxn_count {
            return Err(ApiError::TooManyEmittedTxn);
        }

        let template = memory::read(self.mem, read_ptr, read_len)?.to_vec();
        let parsed =
            Transaction::from_bytes(template.clone()).map_err(|_| ApiError::EmissionFailure)?;
        validate_inner_objects(&template).map_err(|_| ApiError::EmissionFailure)?;
        if parsed.field(fields::EMIT_DETAILS).is_some() {
            return Err(ApiError::EmissionFailure);
        }

        // The fee floor is priced over the stamped size, details included.
        let stamped_len = (template.len() + EmitDetails::SIZE) as u64;
        let floor = emission_fee_floor(stamped_len, self.cached_fee_base())?;
        let fee = parsed.fee();
        if fee > MAX_EMIT_FEE {
            return Err(ApiError::FeeTooLarge);
        }
        if fee < floor {
            return Err(ApiError::EmissionFailure);
        }

        let details = self.build_emit_details()?;
        let stamped = insert_field(&template, fields::EMIT_DETAILS, &details.to_field_bytes())
            .map_err(|_| ApiError::InternalError)?;
        let transaction =
            Transaction::from_bytes(stamped).map_err(|_| ApiError::InternalError)?;

        self.ctx.emitted.push_back(transaction);
        Ok(self.ctx.emitted.len() as i64)
    }

    /// `nonce(write_ptr, write_len)`: writes a fresh 256-bit deterministic nonce.
    pub(crate) fn nonce(&mut self, write_ptr: u32, write_len: u32) -> HostReturn {
        let nonce = self.fresh_nonce()?;
        memory::write(self.mem, write_ptr, write_len, nonce.as_ref())
    }

    // HELPERS
    // --------------------------------------------------------------------------------------------

    /// The ledger base fee, memoized on first use.
    pub(crate) fn cached_fee_base(&mut self) -> u64 {
        match self.ctx.fee_base {
            Some(base) => base,
            None => {
                let base = self.view.base_fee();
                self.ctx.fee_base = Some(base);
                base
            },
        }
    }

    /// The triggering transaction's generation, memoized on first use.
    pub(crate) fn cached_generation(&mut self) -> u32 {
        match self.ctx.generation {
            Some(generation) => generation,
            None => {
                let generation = self.ctx.otxn.generation();
                self.ctx.generation = Some(generation);
                generation
            },
        }
    }

    /// The triggering transaction's burden, memoized on first use.
    pub(crate) fn cached_burden(&mut self) -> u64 {
        match self.ctx.burden {
            Some(burden) => burden,
            None => {
                let burden = self.ctx.otxn.burden();
                self.ctx.burden = Some(burden);
                burden
            },
        }
    }

    /// Burden carried by emitted transactions; requires a declared reserve.
    fn emission_burden(&mut self) -> Result<u64, ApiError> {
        if self.ctx.expected_etxn_count < 0 {
            return Err(ApiError::PrerequisiteNotMet);
        }
        let reserve = self.ctx.expected_etxn_count.max(1) as u64;
        self.cached_burden().checked_mul(reserve).ok_or(ApiError::TooBig)
    }

    /// Derives the next nonce from `(hook account, triggering tx id, counter)`.
    fn fresh_nonce(&mut self) -> Result<Hash256, ApiError> {
        if self.ctx.nonce_counter >= MAX_NONCES {
            return Err(ApiError::TooManyNonces);
        }
        let counter = self.ctx.nonce_counter.to_be_bytes();
        let otxn_id = self.ctx.otxn.id();
        let nonce =
            sha512h_parts(&[self.ctx.account.as_ref(), otxn_id.as_ref(), &counter]);
        self.ctx.nonce_counter += 1;
        let fresh = self.ctx.nonces_used.insert(nonce);
        debug_assert!(fresh, "nonces within one invocation are pairwise distinct");
        Ok(nonce)
    }

    /// The full emission stamp for the next emitted transaction.
    fn build_emit_details(&mut self) -> Result<EmitDetails, ApiError> {
        let burden = self.emission_burden()?;
        let generation = self.cached_generation() + 1;
        let nonce = self.fresh_nonce()?;
        Ok(EmitDetails {
            generation,
            burden,
            parent_txn_id: self.ctx.otxn.id(),
            nonce,
            hook_hash: self.ctx.hook_hash,
            callback: self.ctx.account,
        })
    }
}
