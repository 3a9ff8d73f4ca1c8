//! # Option Ledger
//!
//! Multi-slot balance book. One collateral unit minted gives one unit in
//! every slot; after settlement each holder's slot vector is redeemed for
//! collateral at the final weights.
//!
//! Phases: `Open` until the settle time, `Settleable` from then until
//! `settle` runs (or `exercise` settles lazily), `Settled` afterwards.
//!
//! Every public operation is all-or-nothing: balance rows touched by a call
//! are checkpointed and restored if any later step fails, including a
//! failing collateral transfer or a rejecting receiver.

mod checkpoint;
mod swap;
mod transfers;

use std::collections::{BTreeMap, BTreeSet};

use ladder_math::{weighted_sum, Rounding};
use ladder_types::{Address, LadderError, LadderResult, LedgerConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::collateral::CollateralToken;
use crate::context::CallContext;
use crate::oracle::PriceOracle;
use crate::receiver::{ReceiverRegistry, SlotReceiver};
use crate::weighting::hat_weights;

/// Lifecycle phase of a ledger at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerPhase {
    Open,
    Settleable,
    Settled,
}

/// Multi-slot option ledger
#[derive(Debug, Serialize, Deserialize)]
pub struct OptionLedger {
    config: LedgerConfig,
    /// holder -> balance per slot
    balances: BTreeMap<Address, Vec<u128>>,
    /// Outstanding units per slot; equal across slots until settlement
    total_supply: Vec<u128>,
    /// holder -> operators allowed to move its balances
    operators: BTreeMap<Address, BTreeSet<Address>>,
    /// Pool addresses whose balances only move through pool paths
    pools: BTreeSet<Address>,
    settled: bool,
    settle_price: u128,
    /// Contract accounts; receiver hooks are runtime wiring and restore empty
    #[serde(default, rename = "contracts")]
    receivers: ReceiverRegistry,
}

impl OptionLedger {
    pub fn new(config: LedgerConfig) -> LadderResult<Self> {
        config.validate()?;
        let slots = config.slot_count();

        info!(
            ledger = %config.address,
            slots,
            settle_time = config.settle_time,
            "option ledger created"
        );

        Ok(Self {
            config,
            balances: BTreeMap::new(),
            total_supply: vec![0; slots],
            operators: BTreeMap::new(),
            pools: BTreeSet::new(),
            settled: false,
            settle_price: 0,
            receivers: ReceiverRegistry::default(),
        })
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn address(&self) -> Address {
        self.config.address
    }

    pub fn collateral_address(&self) -> Address {
        self.config.collateral
    }

    pub fn oracle_address(&self) -> Address {
        self.config.oracle
    }

    pub fn strikes(&self) -> &[u128] {
        &self.config.strikes
    }

    pub fn slot_count(&self) -> usize {
        self.config.slot_count()
    }

    pub fn settle_time(&self) -> u64 {
        self.config.settle_time
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Fixed settlement price, once settled
    pub fn settle_price(&self) -> Option<u128> {
        self.settled.then_some(self.settle_price)
    }

    pub fn phase(&self, now: u64) -> LedgerPhase {
        if self.settled {
            LedgerPhase::Settled
        } else if now >= self.config.settle_time {
            LedgerPhase::Settleable
        } else {
            LedgerPhase::Open
        }
    }

    pub fn total_supply(&self, slot: usize) -> LadderResult<u128> {
        self.total_supply
            .get(slot)
            .copied()
            .ok_or(LadderError::UnknownSlot(slot))
    }

    pub fn total_supply_all(&self) -> &[u128] {
        &self.total_supply
    }

    pub fn balance_of(&self, holder: Address, slot: usize) -> LadderResult<u128> {
        if slot >= self.slot_count() {
            return Err(LadderError::UnknownSlot(slot));
        }
        Ok(self.balances.get(&holder).map_or(0, |row| row[slot]))
    }

    pub fn balance_of_all(&self, holder: Address) -> Vec<u128> {
        self.row(holder)
    }

    /// Balance of `holders[k]` in `slots[k]` for every k
    pub fn balance_of_batch(&self, holders: &[Address], slots: &[usize]) -> LadderResult<Vec<u128>> {
        if holders.len() != slots.len() {
            return Err(LadderError::length_mismatch(holders.len(), slots.len()));
        }
        holders
            .iter()
            .zip(slots)
            .map(|(holder, slot)| self.balance_of(*holder, *slot))
            .collect()
    }

    pub fn is_bound_pool(&self, address: Address) -> bool {
        self.pools.contains(&address)
    }

    // ========================================================================
    // Wiring
    // ========================================================================

    /// Record a contract account and its acknowledgement capability
    pub fn register_contract(&mut self, contract: Address, receiver: Option<Box<dyn SlotReceiver>>) {
        info!(contract = %contract, capable = receiver.is_some(), "contract registered");
        self.receivers.register(contract, receiver);
    }

    pub fn is_contract(&self, address: Address) -> bool {
        self.receivers.is_contract(address)
    }

    // ========================================================================
    // Collateral In / Out
    // ========================================================================

    /// Take `amount` collateral from the caller and credit it in every slot
    pub fn mint(
        &mut self,
        call: &CallContext,
        collateral: &mut dyn CollateralToken,
        amount: u128,
    ) -> LadderResult<()> {
        self.ensure_collateral(collateral)?;
        if self.settled {
            return Err(LadderError::AlreadySettled);
        }
        self.ensure_unprotected(call.caller)?;

        let holder = call.caller;
        let ledger = self.address();
        self.atomically(&[holder], |book| {
            book.issue(holder, amount)?;
            collateral.transfer_from(ledger, holder, ledger, amount)
        })?;

        info!(ledger = %ledger, holder = %holder, amount, "minted");
        Ok(())
    }

    /// Debit `amount` from every slot of the caller and return the collateral
    pub fn burn(
        &mut self,
        call: &CallContext,
        collateral: &mut dyn CollateralToken,
        amount: u128,
    ) -> LadderResult<()> {
        self.ensure_collateral(collateral)?;
        self.ensure_unprotected(call.caller)?;

        let holder = call.caller;
        let ledger = self.address();
        self.atomically(&[holder], |book| {
            book.retire(holder, amount)?;
            collateral.transfer(ledger, holder, amount)
        })?;

        info!(ledger = %ledger, holder = %holder, amount, "burned");
        Ok(())
    }

    // ========================================================================
    // Settlement
    // ========================================================================

    /// Fix the settlement price from one oracle read
    pub fn settle(&mut self, call: &CallContext, oracle: &dyn PriceOracle) -> LadderResult<u128> {
        self.ensure_oracle(oracle)?;
        if self.settled {
            return Err(LadderError::AlreadySettled);
        }
        if call.timestamp < self.config.settle_time {
            return Err(LadderError::NotYetSettleable);
        }

        let price = oracle.get()?;
        self.settled = true;
        self.settle_price = price;

        info!(
            ledger = %self.address(),
            price,
            timestamp = call.timestamp,
            "settled"
        );
        Ok(price)
    }

    /// Redeem the caller's whole slot vector for collateral
    ///
    /// Settles first when the settle time has passed and nobody has settled
    /// yet. Returns the collateral paid out.
    pub fn exercise(
        &mut self,
        call: &CallContext,
        oracle: &dyn PriceOracle,
        collateral: &mut dyn CollateralToken,
    ) -> LadderResult<u128> {
        self.ensure_collateral(collateral)?;
        self.ensure_unprotected(call.caller)?;

        let holder = call.caller;
        let ledger = self.address();
        let payout = self.atomically(&[holder], |book| {
            if !book.settled {
                if call.timestamp < book.config.settle_time {
                    return Err(LadderError::NotSettled);
                }
                book.settle(call, oracle)?;
            }

            let weights = hat_weights(&book.config.strikes, book.settle_price)?;
            let balance = book.row(holder);
            let payout = weighted_sum(&weights, &balance, Rounding::Down)?;

            book.debit(holder, &balance)?;
            for (supply, amount) in book.total_supply.iter_mut().zip(&balance) {
                *supply -= *amount;
            }

            collateral.transfer(ledger, holder, payout)?;
            Ok(payout)
        })?;

        info!(ledger = %ledger, holder = %holder, payout, "exercised");
        Ok(payout)
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn row(&self, holder: Address) -> Vec<u128> {
        self.balances
            .get(&holder)
            .cloned()
            .unwrap_or_else(|| vec![0; self.slot_count()])
    }

    fn set_row(&mut self, holder: Address, row: Vec<u128>) {
        if row.iter().all(|amount| *amount == 0) {
            self.balances.remove(&holder);
        } else {
            self.balances.insert(holder, row);
        }
    }

    fn check_len(&self, amounts: &[u128]) -> LadderResult<()> {
        if amounts.len() != self.slot_count() {
            return Err(LadderError::length_mismatch(self.slot_count(), amounts.len()));
        }
        Ok(())
    }

    /// Subtract `amounts` slot-wise; nothing changes on failure
    fn debit(&mut self, holder: Address, amounts: &[u128]) -> LadderResult<()> {
        self.check_len(amounts)?;
        let mut row = self.row(holder);
        for (slot, (balance, amount)) in row.iter_mut().zip(amounts).enumerate() {
            *balance = balance
                .checked_sub(*amount)
                .ok_or(LadderError::InsufficientSlotBalance { slot })?;
        }
        self.set_row(holder, row);
        Ok(())
    }

    /// Add `amounts` slot-wise; nothing changes on failure
    fn credit(&mut self, holder: Address, amounts: &[u128]) -> LadderResult<()> {
        self.check_len(amounts)?;
        let mut row = self.row(holder);
        for (balance, amount) in row.iter_mut().zip(amounts) {
            *balance = balance
                .checked_add(*amount)
                .ok_or(LadderError::MathOverflow("slot balance"))?;
        }
        self.set_row(holder, row);
        Ok(())
    }

    /// Debit `from` then credit `to`; callers wrap this in `atomically`
    fn move_slots(&mut self, from: Address, to: Address, amounts: &[u128]) -> LadderResult<()> {
        self.debit(from, amounts)?;
        self.credit(to, amounts)
    }

    /// New units in every slot
    fn issue(&mut self, holder: Address, amount: u128) -> LadderResult<()> {
        let mut supply = self.total_supply.clone();
        for total in supply.iter_mut() {
            *total = total
                .checked_add(amount)
                .ok_or(LadderError::MathOverflow("slot supply"))?;
        }
        self.credit(holder, &vec![amount; self.slot_count()])?;
        self.total_supply = supply;
        Ok(())
    }

    /// Remove units from every slot
    fn retire(&mut self, holder: Address, amount: u128) -> LadderResult<()> {
        self.debit(holder, &vec![amount; self.slot_count()])?;
        for total in self.total_supply.iter_mut() {
            *total -= amount;
        }
        Ok(())
    }

    fn ensure_unprotected(&self, holder: Address) -> LadderResult<()> {
        if self.pools.contains(&holder) {
            return Err(LadderError::ProtectedAccount(holder));
        }
        Ok(())
    }

    fn ensure_collateral(&self, collateral: &dyn CollateralToken) -> LadderResult<()> {
        if collateral.address() != self.config.collateral {
            return Err(LadderError::account_mismatch(
                self.config.collateral,
                collateral.address(),
            ));
        }
        Ok(())
    }

    fn ensure_oracle(&self, oracle: &dyn PriceOracle) -> LadderResult<()> {
        if oracle.address() != self.config.oracle {
            return Err(LadderError::account_mismatch(self.config.oracle, oracle.address()));
        }
        Ok(())
    }
}
