//! Shared types for the Ladder option market
//!
//! This crate provides the account identifier, the error taxonomy, protocol
//! constants and the immutable configuration structs used by the math and
//! core crates.

pub mod address;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export all public types
pub use address::*;
pub use config::*;
pub use constants::*;
pub use errors::*;

/// Result type alias using the shared error type
pub type LadderResult<T> = std::result::Result<T, LadderError>;
