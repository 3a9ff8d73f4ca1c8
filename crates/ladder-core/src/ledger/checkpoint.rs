use ladder_types::{Address, LadderResult};

use super::OptionLedger;

/// Saved copy of the rows one operation may touch
pub(crate) struct Checkpoint {
    rows: Vec<(Address, Option<Vec<u128>>)>,
    total_supply: Vec<u128>,
    settled: bool,
    settle_price: u128,
}

impl OptionLedger {
    pub(crate) fn checkpoint(&self, holders: &[Address]) -> Checkpoint {
        Checkpoint {
            rows: holders
                .iter()
                .map(|holder| (*holder, self.balances.get(holder).cloned()))
                .collect(),
            total_supply: self.total_supply.clone(),
            settled: self.settled,
            settle_price: self.settle_price,
        }
    }

    pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
        for (holder, row) in checkpoint.rows {
            match row {
                Some(row) => {
                    self.balances.insert(holder, row);
                }
                None => {
                    self.balances.remove(&holder);
                }
            }
        }
        self.total_supply = checkpoint.total_supply;
        self.settled = checkpoint.settled;
        self.settle_price = checkpoint.settle_price;
    }

    /// Run `op`; if it fails, put `holders`' rows and the ledger totals back
    pub(crate) fn atomically<T>(
        &mut self,
        holders: &[Address],
        op: impl FnOnce(&mut Self) -> LadderResult<T>,
    ) -> LadderResult<T> {
        let checkpoint = self.checkpoint(holders);
        let result = op(self);
        if result.is_err() {
            self.restore(checkpoint);
        }
        result
    }
}
