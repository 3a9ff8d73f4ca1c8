//! Slot transfers: the plain vector transfer, the operator-approved safe
//! single/batch transfers with receiver acknowledgement, and approvals.

use ladder_types::{Address, LadderError, LadderResult};
use tracing::{debug, info};

use super::OptionLedger;
use crate::context::CallContext;

impl OptionLedger {
    /// Move `amounts[i]` of slot i from the caller to `to`, all slots at once
    ///
    /// No acknowledgement is asked of the recipient.
    pub fn transfer(&mut self, call: &CallContext, to: Address, amounts: &[u128]) -> LadderResult<()> {
        self.check_len(amounts)?;
        if to.is_zero() {
            return Err(LadderError::ZeroAddress);
        }
        let from = call.caller;
        self.ensure_unprotected(from)?;

        self.atomically(&[from, to], |book| book.move_slots(from, to, amounts))?;

        debug!(ledger = %self.address(), from = %from, to = %to, ?amounts, "slots transferred");
        Ok(())
    }

    /// Move `amount` of one slot from `from` to `to` on the holder's or an
    /// operator's authority; contract recipients must acknowledge
    pub fn safe_transfer_from(
        &mut self,
        call: &CallContext,
        from: Address,
        to: Address,
        slot: usize,
        amount: u128,
    ) -> LadderResult<()> {
        self.ensure_authorized(call.caller, from)?;
        if slot >= self.slot_count() {
            return Err(LadderError::UnknownSlot(slot));
        }
        if to.is_zero() {
            return Err(LadderError::ZeroAddress);
        }
        self.ensure_unprotected(from)?;

        let mut amounts = vec![0; self.slot_count()];
        amounts[slot] = amount;
        let operator = call.caller;

        self.atomically(&[from, to], |book| {
            book.move_slots(from, to, &amounts)?;
            book.receivers.acknowledge_single(operator, from, to, slot, amount)
        })?;

        debug!(ledger = %self.address(), from = %from, to = %to, slot, amount, "slot transferred");
        Ok(())
    }

    /// Batch form of [`safe_transfer_from`](Self::safe_transfer_from);
    /// repeated slots add up
    pub fn safe_batch_transfer_from(
        &mut self,
        call: &CallContext,
        from: Address,
        to: Address,
        slots: &[usize],
        amounts: &[u128],
    ) -> LadderResult<()> {
        self.ensure_authorized(call.caller, from)?;
        if slots.len() != amounts.len() {
            return Err(LadderError::length_mismatch(slots.len(), amounts.len()));
        }
        if to.is_zero() {
            return Err(LadderError::ZeroAddress);
        }
        self.ensure_unprotected(from)?;

        let mut totals = vec![0u128; self.slot_count()];
        for (&slot, &amount) in slots.iter().zip(amounts) {
            let total = totals.get_mut(slot).ok_or(LadderError::UnknownSlot(slot))?;
            *total = total
                .checked_add(amount)
                .ok_or(LadderError::MathOverflow("batch amount"))?;
        }
        let operator = call.caller;

        self.atomically(&[from, to], |book| {
            book.move_slots(from, to, &totals)?;
            book.receivers.acknowledge_batch(operator, from, to, slots, amounts)
        })?;

        debug!(ledger = %self.address(), from = %from, to = %to, ?slots, ?amounts, "batch transferred");
        Ok(())
    }

    /// Allow or revoke `operator` moving every slot of the caller
    pub fn set_approval_for_all(
        &mut self,
        call: &CallContext,
        operator: Address,
        approved: bool,
    ) -> LadderResult<()> {
        if operator.is_zero() {
            return Err(LadderError::ZeroAddress);
        }

        let holder = call.caller;
        if approved {
            self.operators.entry(holder).or_default().insert(operator);
        } else if let Some(set) = self.operators.get_mut(&holder) {
            set.remove(&operator);
            if set.is_empty() {
                self.operators.remove(&holder);
            }
        }

        info!(holder = %holder, operator = %operator, approved, "operator approval");
        Ok(())
    }

    pub fn is_approved_for_all(&self, holder: Address, operator: Address) -> bool {
        self.operators
            .get(&holder)
            .is_some_and(|set| set.contains(&operator))
    }

    fn ensure_authorized(&self, caller: Address, holder: Address) -> LadderResult<()> {
        if caller == holder || self.is_approved_for_all(holder, caller) {
            Ok(())
        } else {
            Err(LadderError::NotApproved)
        }
    }
}
