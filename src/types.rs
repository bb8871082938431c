//! Re-exported types from external crates for convenience.
//!
//! These types appear throughout the public API of this SDK and are re-exported
//! here so users don't need to add these dependencies to their `Cargo.toml`.

/// Ethereum address type and the [`address!`] macro for compile-time address literals.
/// [`ChainId`] is a type alias for `u64` representing EVM chain IDs.
pub use alloy::primitives::{Address, ChainId, address};
/// Fixed 32-byte hashes and 256-bit unsigned integers backing every identifier.
pub use alloy::primitives::{B256, U256, b256};
/// Date and time types for indexer timestamps.
pub use chrono::{DateTime, Utc};
/// Arbitrary precision decimal type for reported payouts.
pub use rust_decimal::Decimal;
/// Macro for creating [`Decimal`] literals at compile time.
///
/// # Example
/// ```
/// use conditional_tokens_sdk::types::dec;
/// let half = dec!(0.5);
/// ```
pub use rust_decimal_macros::dec;
