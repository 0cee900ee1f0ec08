//! Shared helpers for integration tests

#![allow(dead_code)]

use std::time::{SystemTime, UNIX_EPOCH};

use tron_proto::{Transaction, TransactionContract, TransactionRaw, TransferContract};
use tron_sdk::{Address, Wallet};

/// Route SDK logs to the test output; `RUST_LOG` picks the level
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Address with a repeated 20-byte tail
pub fn addr(byte: u8) -> Address {
    Address::from_evm_bytes([byte; 20])
}

/// Deterministic wallet; `byte` must be non-zero
pub fn wallet(byte: u8) -> Wallet {
    Wallet::from_private_key(&[byte; 32]).unwrap()
}

/// Unix milliseconds one hour from now
pub fn in_one_hour_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
        + 3_600_000
}

/// Unsigned native transfer of `amount` sun
pub fn transfer_tx(amount: i64) -> Transaction {
    let payload = TransferContract {
        owner_address: addr(1).as_bytes().to_vec(),
        to_address: addr(2).as_bytes().to_vec(),
        amount,
    };
    Transaction {
        raw_data: Some(TransactionRaw {
            contract: vec![TransactionContract::new(&payload)],
            expiration: in_one_hour_ms(),
            timestamp: 1,
            ..Default::default()
        }),
        ..Default::default()
    }
}
