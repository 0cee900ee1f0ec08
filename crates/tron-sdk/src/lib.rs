//! # tron-sdk
//!
//! Rust client SDK for TRON full nodes.
//!
//! ## Features
//!
//! - **TronClient**: typed gRPC facade over a bounded connection pool
//! - **CallContext**: deadlines and cancellation for every network call
//! - **ABI**: Solidity-compatible codec, interface loading, revert decoding
//! - **EventRegistry**: selector-keyed log decoding
//! - **Contract**: read, simulate, and build calls against one contract
//! - **TransactionWorkflow**: sign, (multi-)sign, estimate, broadcast, and wait
//! - **Trc20**: fungible-token façade with exact decimal conversion and lossless balances
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tron_sdk::{CallContext, TransactionWorkflow, TronClient, Wallet};
//! use tron_primitives::Address;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TronClient::connect("grpc.trongrid.io:50051").await?;
//!     let ctx = CallContext::background();
//!
//!     let wallet = Wallet::from_private_key_hex(&std::env::var("TRON_KEY")?)?;
//!     let to: Address = "TQd22wygQNcAJt1yRwtPj8wApXtUHYXGhN".parse()?;
//!
//!     // 1 TRX = 1_000_000 sun
//!     let built = client.create_transfer(&ctx, &wallet.address(), &to, 1_000_000).await?;
//!     let workflow = TransactionWorkflow::new(client, built)?;
//!     workflow.sign(&wallet).await?;
//!     let result = workflow.broadcast(&ctx, 0).await?;
//!     println!("sent {}", result.tx_id);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Tokens
//!
//! ```rust,no_run
//! use std::str::FromStr;
//! use tron_sdk::{CallContext, TransactionWorkflow, TronClient, Trc20, Wallet};
//! use tron_primitives::{Address, Decimal};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TronClient::connect("grpc.trongrid.io:50051").await?;
//!     let ctx = CallContext::with_timeout(std::time::Duration::from_secs(30));
//!     let wallet = Wallet::new_random();
//!
//!     let usdt: Address = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t".parse()?;
//!     let token = Trc20::new(client.clone(), &ctx, usdt).await?;
//!     println!("balance: {}", token.balance_of(&ctx, &wallet.address()).await?);
//!
//!     let to: Address = "TH8LtkoNLhBKYHDV7NecnohMYK4rFoVp6L".parse()?;
//!     let built = token
//!         .transfer(&ctx, &wallet.address(), &to, Decimal::from_str("12.5")?)
//!         .await?;
//!     let workflow = TransactionWorkflow::new(client, built)?;
//!     workflow.set_fee_limit(30_000_000).await?;
//!     workflow.sign(&wallet).await?;
//!
//!     // wait up to 20s for the receipt
//!     let result = workflow.broadcast(&ctx, 20).await?;
//!     if let Some(receipt) = result.receipt {
//!         println!("energy used: {}", receipt.energy_used);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
mod client;
mod context;
pub mod contract;
mod error;
pub mod pool;
pub mod registry;
mod signer;
mod transport;
pub mod trc20;
pub mod workflow;

// Re-export main types
pub use client::{TronClient, ENERGY_FEE_PARAMETER, TRANSACTION_FEE_PARAMETER};
pub use context::CallContext;
pub use contract::{Contract, DeployParams, SimulationResult};
pub use error::{SdkError, SdkResult};
pub use pool::{ConnectionPool, Dialer, Endpoint, PoolConfig, PoolError, PooledConnection};
pub use registry::{DecodedEvent, DecodedParam, EventRegistry};
pub use signer::{Signer, Wallet};
pub use trc20::{TokenMetadata, Trc20};
pub use workflow::{
    BroadcastResult, ExecutionStatus, FeeEstimate, Receipt, TransactionWorkflow, TxSource, TxState,
};

/// Transport seam for custom or test backends
pub use transport::{GrpcDialer, GrpcTransport, MockDialer, MockTransport, Transport};

// Re-export primitives for convenience
pub use tron_primitives::{Address, Decimal, TokenAmount, H256, U256};
pub use tron_proto as proto;
