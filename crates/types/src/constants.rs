//! Protocol constants used across the Ladder crates

// ============================================================================
// Mathematical Constants
// ============================================================================

/// Q64 fixed-point scale factor: 2^64 (one unit in 64.64)
pub const Q64: u128 = 1u128 << 64;

/// Q96 format for square-root prices read from AMM pools
pub const Q96: u128 = 1u128 << 96;

/// ln(2) in Q64.64
pub const LN_2_Q64: u128 = 12_786_308_645_202_655_659;

/// 2/sqrt(pi) in Q64.64
pub const TWO_OVER_SQRT_PI_Q64: u128 = 20_814_921_713_516_466_458;

/// 1/sqrt(pi) in Q64.64
pub const ONE_OVER_SQRT_PI_Q64: u128 = 10_407_460_856_758_233_229;

/// 1/sqrt(2) in Q64.64
pub const ONE_OVER_SQRT_2_Q64: u128 = 13_043_817_825_332_782_212;

// ============================================================================
// Slot Ladder Constants
// ============================================================================

/// Fewest strikes a ladder may carry
pub const MIN_SLOTS: usize = 2;

/// Most strikes a ladder may carry
pub const MAX_SLOTS: usize = 16;

// ============================================================================
// Receiver Acknowledgements
// ============================================================================

/// Value a contract recipient returns to accept a single-slot transfer
pub const SINGLE_RECEIVED_ACK: u32 = 0xf23a_6e61;

/// Value a contract recipient returns to accept a batch transfer
pub const BATCH_RECEIVED_ACK: u32 = 0xbc19_7c81;

// ============================================================================
// Pool Constants
// ============================================================================

/// Allowance value that is never decremented by `transfer_from`
pub const UNLIMITED_ALLOWANCE: u128 = u128::MAX;

/// Smallest accepted fee multiplier (1.0 in Q64.64)
pub const MIN_FEE_RATE: u128 = Q64;
