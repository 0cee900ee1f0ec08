//! Common error types for primitives

use thiserror::Error;

use crate::address::AddressError;
use crate::hash::HashError;

/// Primitive operation error
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PrimitiveError {
    /// Address error
    #[error("address error: {0}")]
    Address(#[from] AddressError),

    /// Hash error
    #[error("hash error: {0}")]
    Hash(#[from] HashError),

    /// Amount conversion error
    #[error("invalid amount: {0}")]
    Amount(String),
}
