//! Keccak-256 and SHA-256 hashing

use sha2::Sha256;
use sha3::{Digest, Keccak256};
use tron_primitives::H256;

/// Compute Keccak-256 hash of the input data
pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    H256::from_bytes(hasher.finalize().into())
}

/// Compute SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> H256 {
    H256::from_bytes(Sha256::digest(data).into())
}

/// Digest used to derive a transaction ID from serialized `raw_data`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxIdAlgorithm {
    /// Keccak-256
    #[default]
    Keccak256,
    /// SHA-256
    Sha256,
}

impl TxIdAlgorithm {
    /// Hash serialized raw transaction bytes
    pub fn digest(self, raw: &[u8]) -> H256 {
        match self {
            TxIdAlgorithm::Keccak256 => keccak256(raw),
            TxIdAlgorithm::Sha256 => sha256(raw),
        }
    }
}
