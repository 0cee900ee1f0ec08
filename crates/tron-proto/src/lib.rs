//! # tron-proto
//!
//! Protobuf messages of the node's wallet service, maintained by hand with
//! `prost` derives. Only the subset the SDK talks to is modelled; unknown
//! fields on responses are skipped by the decoder.
//!
//! Field numbers follow the node's published schema exactly. Transaction
//! IDs are hashes over the serialized `raw_data`, so [`TransactionRaw`] must
//! carry every field the node may set.

#![warn(clippy::all)]

mod any;
pub mod api;
pub mod contract;
pub mod chain;
pub mod wallet;

pub use crate::any::{Any, ContractPayload, TYPE_URL_PREFIX};
pub use crate::api::*;
pub use crate::contract::*;
pub use crate::chain::*;

pub use prost::Message;
