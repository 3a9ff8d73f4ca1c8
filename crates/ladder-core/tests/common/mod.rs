//! Shared fixtures: a wired ledger + pool market, a faucet collateral token,
//! a manual oracle and receiver mocks.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use ladder_core::oracle::ManualOracle;
use ladder_core::{
    Address, CallContext, CollateralToken, CurveConfig, LadderResult, LedgerConfig, MarketConfig,
    OptionLedger, PoolConfig, SimpleToken, SlotReceiver, SwapPool, TokenInfo,
};
use ladder_types::{BATCH_RECEIVED_ACK, Q64, SINGLE_RECEIVED_ACK};
use tracing_subscriber::EnvFilter;

/// 10^18, one collateral unit
pub const ONE: u128 = 1_000_000_000_000_000_000;

pub const SETTLE_TIME: u64 = 1_700_000_000;
pub const CLOSE_TIME: u64 = SETTLE_TIME - 100;
pub const DESTROY_TIME: u64 = SETTLE_TIME + 100;
/// A trading-hours instant
pub const NOW: u64 = SETTLE_TIME - 10_000;

pub const OWNER: Address = addr(1);
pub const ALICE: Address = addr(2);
pub const BOB: Address = addr(3);
pub const ORACLE_ADMIN: Address = addr(9);
pub const LEDGER: Address = addr(0x1000);
pub const POOL: Address = addr(0x2000);
pub const TOKEN: Address = addr(0x3000);
pub const ORACLE: Address = addr(0x4000);
pub const ASSET: Address = addr(0x5000);

/// Faucet balance of every test account
pub const FAUCET: u128 = 1_000 * ONE;

/// 0.01 in Q64.64
pub const WIDTH: u128 = 0x28f_5c28_f5c2_9000;
pub const VOLATILITY: u128 = 416_757_209_401_000_000;
/// 1.0078125 in Q64.64
pub const FEE_RATE: u128 = 0x1_0200_0000_0000_0000;

pub const fn addr(n: u64) -> Address {
    let b = n.to_be_bytes();
    Address([
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
    ])
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn at(caller: Address, timestamp: u64) -> CallContext {
    CallContext::new(caller, timestamp)
}

/// Strikes 0.1, 0.2, ... in Q64.64
pub fn ladder(slots: usize) -> Vec<u128> {
    (1..=slots as u128).map(|i| i * Q64 / 10).collect()
}

pub struct MarketBuilder {
    slots: usize,
    curve: CurveConfig,
    fee_rate: u128,
    price: u128,
}

impl MarketBuilder {
    pub fn new() -> Self {
        Self {
            slots: 4,
            curve: CurveConfig::Plain { width: WIDTH },
            fee_rate: FEE_RATE,
            price: 2 * Q64 / 10,
        }
    }

    pub fn slots(mut self, slots: usize) -> Self {
        self.slots = slots;
        self
    }

    pub fn curve(mut self, curve: CurveConfig) -> Self {
        self.curve = curve;
        self
    }

    pub fn fee_rate(mut self, fee_rate: u128) -> Self {
        self.fee_rate = fee_rate;
        self
    }

    pub fn price(mut self, price: u128) -> Self {
        self.price = price;
        self
    }

    pub fn config(&self) -> MarketConfig {
        MarketConfig {
            ledger: LedgerConfig {
                address: LEDGER,
                collateral: TOKEN,
                oracle: ORACLE,
                settle_time: SETTLE_TIME,
                strikes: ladder(self.slots),
            },
            pool: PoolConfig {
                address: POOL,
                owner: OWNER,
                ledger: LEDGER,
                open_time: 0,
                close_time: CLOSE_TIME,
                destroy_time: DESTROY_TIME,
                fee_rate: self.fee_rate,
                curve: self.curve,
            },
        }
    }

    pub fn build(self) -> Market {
        init_tracing();
        let config = self.config();
        config.validate().unwrap();

        let mut ledger = OptionLedger::new(config.ledger).unwrap();
        let pool = SwapPool::new(config.pool, &ledger).unwrap();
        ledger.bind_pool(&pool).unwrap();

        let mut token = SimpleToken::new(TOKEN, "USD");
        for account in [OWNER, ALICE, BOB] {
            token.mint(account, FAUCET).unwrap();
            token.approve(account, LEDGER, u128::MAX).unwrap();
        }

        let oracle = ManualOracle::new(
            ORACLE,
            ORACLE_ADMIN,
            TokenInfo::new(ASSET, "ETH"),
            TokenInfo::new(TOKEN, "USD"),
            self.price,
        );

        Market {
            ledger,
            pool,
            token,
            oracle,
        }
    }
}

pub struct Market {
    pub ledger: OptionLedger,
    pub pool: SwapPool,
    pub token: SimpleToken,
    pub oracle: ManualOracle,
}

impl Market {
    pub fn slots(&self) -> usize {
        self.ledger.slot_count()
    }

    pub fn mint(&mut self, who: Address, amount: u128) {
        self.ledger.mint(&at(who, NOW), &mut self.token, amount).unwrap();
    }

    /// Owner mints `per_slot`, hands the full set to the pool and inits it
    pub fn seed_pool(&mut self, per_slot: u128) -> u128 {
        self.mint(OWNER, per_slot);
        let amounts = vec![per_slot; self.slots()];
        self.ledger.transfer(&at(OWNER, NOW), POOL, &amounts).unwrap();
        self.pool.init(&at(OWNER, NOW), &self.ledger, &self.oracle).unwrap()
    }

    pub fn set_price(&mut self, price: u128) {
        self.oracle.set_price(ORACLE_ADMIN, price).unwrap();
    }

    pub fn swap(&mut self, who: Address, out: &[u128], paid_in: &[u128]) -> LadderResult<()> {
        self.ledger
            .swap(&at(who, NOW), &mut self.pool, &self.oracle, out, paid_in)
    }

    pub fn weights(&self, now: u64) -> Vec<u128> {
        self.pool.weights(now, &self.ledger, &self.oracle).unwrap()
    }

    pub fn collateral_of(&self, who: Address) -> u128 {
        self.token.balance_of(who)
    }

    /// Amounts vector with `amount` in `slot` and zero elsewhere
    pub fn one_slot(&self, slot: usize, amount: u128) -> Vec<u128> {
        let mut amounts = vec![0; self.slots()];
        amounts[slot] = amount;
        amounts
    }
}

// ============================================================================
// Receiver Mocks
// ============================================================================

/// What a mock receiver answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Accept,
    WrongValue,
    Refuse,
}

/// Receiver that records every acknowledgement request
pub struct RecordingReceiver {
    pub answer: Answer,
    pub calls: Rc<RefCell<Vec<(Address, Vec<usize>, Vec<u128>)>>>,
}

impl RecordingReceiver {
    pub fn new(answer: Answer) -> (Self, Rc<RefCell<Vec<(Address, Vec<usize>, Vec<u128>)>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                answer,
                calls: Rc::clone(&calls),
            },
            calls,
        )
    }

    fn reply(&self, ack: u32) -> LadderResult<u32> {
        match self.answer {
            Answer::Accept => Ok(ack),
            Answer::WrongValue => Ok(ack ^ 1),
            Answer::Refuse => Err(ladder_core::LadderError::ReceiverRejected(
                "not accepting".to_string(),
            )),
        }
    }
}

impl SlotReceiver for RecordingReceiver {
    fn on_received(
        &mut self,
        _operator: Address,
        from: Address,
        slot: usize,
        amount: u128,
    ) -> LadderResult<u32> {
        self.calls.borrow_mut().push((from, vec![slot], vec![amount]));
        self.reply(SINGLE_RECEIVED_ACK)
    }

    fn on_batch_received(
        &mut self,
        _operator: Address,
        from: Address,
        slots: &[usize],
        amounts: &[u128],
    ) -> LadderResult<u32> {
        self.calls
            .borrow_mut()
            .push((from, slots.to_vec(), amounts.to_vec()));
        self.reply(BATCH_RECEIVED_ACK)
    }
}
