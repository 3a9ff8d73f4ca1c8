//! # Receiver Acknowledgement
//!
//! Contract accounts must acknowledge slot transfers sent to them through
//! the safe transfer paths. Whether an address is a contract, and whether it
//! implements the acknowledgement capability, is recorded explicitly in a
//! registry instead of being inspected at call time.
//!
//! Only the contract addresses are persisted. A restored contract refuses
//! safe transfers until its receiver is registered again.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use ladder_types::{Address, LadderError, LadderResult, BATCH_RECEIVED_ACK, SINGLE_RECEIVED_ACK};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

/// Acknowledgement capability of a contract recipient
pub trait SlotReceiver {
    /// Return [`SINGLE_RECEIVED_ACK`] to accept, anything else (or an error)
    /// to refuse
    fn on_received(
        &mut self,
        operator: Address,
        from: Address,
        slot: usize,
        amount: u128,
    ) -> LadderResult<u32>;

    /// Return [`BATCH_RECEIVED_ACK`] to accept
    fn on_batch_received(
        &mut self,
        operator: Address,
        from: Address,
        slots: &[usize],
        amounts: &[u128],
    ) -> LadderResult<u32>;
}

/// Contract accounts known to a ledger
#[derive(Default)]
pub struct ReceiverRegistry {
    /// `None` marks a contract without the capability
    contracts: BTreeMap<Address, Option<Box<dyn SlotReceiver>>>,
}

impl fmt::Debug for ReceiverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.contracts
                    .iter()
                    .map(|(address, receiver)| (address, receiver.is_some())),
            )
            .finish()
    }
}

impl Serialize for ReceiverRegistry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.contracts.keys())
    }
}

impl<'de> Deserialize<'de> for ReceiverRegistry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let addresses = BTreeSet::<Address>::deserialize(deserializer)?;
        Ok(Self {
            contracts: addresses.into_iter().map(|address| (address, None)).collect(),
        })
    }
}

impl ReceiverRegistry {
    pub fn register(&mut self, contract: Address, receiver: Option<Box<dyn SlotReceiver>>) {
        self.contracts.insert(contract, receiver);
    }

    pub fn is_contract(&self, address: Address) -> bool {
        self.contracts.contains_key(&address)
    }

    /// Ask a contract recipient to accept a single-slot transfer
    ///
    /// Externally owned accounts always accept.
    pub fn acknowledge_single(
        &mut self,
        operator: Address,
        from: Address,
        to: Address,
        slot: usize,
        amount: u128,
    ) -> LadderResult<()> {
        let Some(entry) = self.contracts.get_mut(&to) else {
            return Ok(());
        };
        let Some(receiver) = entry.as_mut() else {
            return Err(reject(to, "recipient does not implement the receiver capability"));
        };

        match receiver.on_received(operator, from, slot, amount) {
            Ok(SINGLE_RECEIVED_ACK) => Ok(()),
            Ok(other) => Err(reject(to, &format!("unexpected acknowledgement {:#010x}", other))),
            Err(err) => Err(reject(to, &err.to_string())),
        }
    }

    /// Ask a contract recipient to accept a batch transfer
    pub fn acknowledge_batch(
        &mut self,
        operator: Address,
        from: Address,
        to: Address,
        slots: &[usize],
        amounts: &[u128],
    ) -> LadderResult<()> {
        let Some(entry) = self.contracts.get_mut(&to) else {
            return Ok(());
        };
        let Some(receiver) = entry.as_mut() else {
            return Err(reject(to, "recipient does not implement the receiver capability"));
        };

        match receiver.on_batch_received(operator, from, slots, amounts) {
            Ok(BATCH_RECEIVED_ACK) => Ok(()),
            Ok(other) => Err(reject(to, &format!("unexpected acknowledgement {:#010x}", other))),
            Err(err) => Err(reject(to, &err.to_string())),
        }
    }
}

fn reject(to: Address, reason: &str) -> LadderError {
    warn!(recipient = %to, reason, "receiver rejected transfer");
    LadderError::ReceiverRejected(format!("{}: {}", to, reason))
}
