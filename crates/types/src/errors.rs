use thiserror::Error;

use crate::address::Address;

// ============================================================================
// Main Error Enum
// ============================================================================

/// Every failure the ledger, the pool or the math layer can report.
///
/// Each variant is a distinct, named condition. An operation that returns
/// one of these has not changed any state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LadderError {
    // ========================================================================
    // Math Errors
    // ========================================================================

    /// Arithmetic overflow occurred
    #[error("Math overflow in '{0}'")]
    MathOverflow(&'static str),

    /// Arithmetic underflow occurred
    #[error("Math underflow in '{0}'")]
    MathUnderflow(&'static str),

    /// Division by zero
    #[error("Division by zero in '{0}'")]
    DivisionByZero(&'static str),

    #[error("Invalid logarithm input")]
    InvalidLogarithmInput,

    // ========================================================================
    // Balance Errors
    // ========================================================================

    /// Collateral (or other fungible) balance too small
    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Insufficient allowance")]
    InsufficientAllowance,

    /// A holder is short in at least one slot
    #[error("Not enough option in slot {slot}")]
    InsufficientSlotBalance { slot: usize },

    #[error("Amount exceeds share balance")]
    ExceedsShareBalance,

    // ========================================================================
    // Pool Errors
    // ========================================================================

    /// The trade would reduce the pool's weighted value
    #[error("Price mismatch check failed: value in {value_in} < value out {value_out}")]
    PriceMismatchCheck { value_in: u128, value_out: u128 },

    #[error("Insufficient pool liquidity in slot {slot}")]
    InsufficientPoolLiquidity { slot: usize },

    #[error("Market closed")]
    MarketClosed,

    #[error("Pool already initialized")]
    AlreadyInitialized,

    #[error("Pool not initialized")]
    NotInitialized,

    #[error("Pool destroyed")]
    PoolDestroyed,

    /// Cached reserve exceeds what the ledger actually holds for the pool
    #[error("Reserve in slot {slot} exceeds ledger balance")]
    InconsistentReserves { slot: usize },

    // ========================================================================
    // Settlement Errors
    // ========================================================================

    #[error("Settle time not reached")]
    NotYetSettleable,

    #[error("Already settled")]
    AlreadySettled,

    #[error("Not settled")]
    NotSettled,

    // ========================================================================
    // Access Control Errors
    // ========================================================================

    #[error("Destroy time not reached")]
    NotDestroyTime,

    #[error("Caller is not the owner")]
    NotOwner,

    #[error("Caller is neither holder nor approved operator")]
    NotApproved,

    /// Balance of a bound pool can only move through the pool itself
    #[error("Account {0} is protected")]
    ProtectedAccount(Address),

    // ========================================================================
    // Argument Errors
    // ========================================================================

    #[error("Zero address")]
    ZeroAddress,

    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Unknown slot {0}")]
    UnknownSlot(usize),

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Invalid price")]
    InvalidPrice,

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    // ========================================================================
    // Collaborator Errors
    // ========================================================================

    /// Contract recipient declined or answered with the wrong value
    #[error("Receiver rejected transfer: {0}")]
    ReceiverRejected(String),

    /// A collaborator other than the configured one was supplied
    #[error("Account mismatch: expected {expected}, got {actual}")]
    AccountMismatch { expected: Address, actual: Address },

    #[error("Pool {0} is not bound to this ledger")]
    UnknownPool(Address),

    // ========================================================================
    // Configuration Errors
    // ========================================================================

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LadderError {
    /// Create an invalid parameter error with reason
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Create an account mismatch error
    pub fn account_mismatch(expected: Address, actual: Address) -> Self {
        Self::AccountMismatch { expected, actual }
    }

    /// Create a length mismatch error
    pub fn length_mismatch(expected: usize, actual: usize) -> Self {
        Self::LengthMismatch { expected, actual }
    }
}
