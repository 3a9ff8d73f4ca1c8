//! # Ladder Core - Option Ledger and Swap Pool
//!
//! A multi-slot option instrument minted against collateral, and a swap
//! pool that trades value between its slots under an oracle- and
//! time-weighted invariant. It provides:
//!
//! - `OptionLedger`: mint/burn, slot transfers, settlement and exercise
//! - `SwapPool`: trade acceptance, proportional liquidity, wind-down
//! - Weighting curves mapping spot price and time to slot weights
//! - Oracle adapters normalizing external prices to Q64.64
//!
//! Collaborators (collateral token, oracle, pool) are passed explicitly to
//! each call and checked against the addresses fixed at construction.

pub mod collateral;
pub mod context;
pub mod ledger;
pub mod oracle;
pub mod pool;
pub mod receiver;
pub mod token;
pub mod weighting;

// Re-export commonly used items
pub use collateral::{CollateralToken, SimpleToken};
pub use context::CallContext;
pub use ledger::{LedgerPhase, OptionLedger};
pub use oracle::{PriceOracle, TokenInfo};
pub use pool::{PoolStatus, SwapPool};
pub use receiver::SlotReceiver;
pub use token::FungibleLedger;
pub use weighting::{WeightCurve, WeightingFunction};

pub use ladder_types::{
    Address, CurveConfig, LadderError, LadderResult, LedgerConfig, MarketConfig, OptionKind,
    PoolConfig,
};
