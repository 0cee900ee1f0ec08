//! # tron-primitives
//!
//! Primitive types for the TRON client SDK.
//!
//! - [`Address`]: 21-byte network address with base58check and hex forms
//! - [`H256`]: 32-byte digest (transaction IDs, event topics)
//! - [`amount`]: fixed-point decimal <-> base-unit conversion and [`TokenAmount`]

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
pub mod amount;
mod error;
mod hash;

pub use address::{Address, AddressError, MAINNET_PREFIX};
pub use amount::TokenAmount;
pub use error::PrimitiveError;
pub use hash::{HashError, H256};

// Re-export primitive-types for U256
pub use primitive_types::U256;
pub use rust_decimal::Decimal;

/// Base units per whole unit of the native coin (1 coin = 10^6 sun)
pub const SUN_PER_COIN: u64 = 1_000_000;

/// Decimal places of the native coin
pub const NATIVE_DECIMALS: u32 = 6;
