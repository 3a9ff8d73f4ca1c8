//! Mathematical utilities for the Ladder option market
//!
//! This crate provides checked integer arithmetic, 64.64 fixed-point
//! functions (including the normal distribution used by the weighting
//! curves) and the weighted-sum reducer that values a pool's reserves.

pub mod fixed_point;
pub mod safe;
pub mod weighted;

// Re-export commonly used functions
pub use fixed_point::*;
pub use safe::*;
pub use weighted::*;
