//! # tron-crypto
//!
//! Cryptographic primitives for the TRON client SDK.
//!
//! - Keccak-256 and SHA-256 hashing
//! - Recoverable ECDSA signing/verification (secp256k1, low-s, `v ∈ {0,1}`)
//! - Public key recovery
//! - Address derivation

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod hash;
mod signature;

pub use error::CryptoError;
pub use hash::{keccak256, sha256, TxIdAlgorithm};
pub use signature::{
    public_key_to_address, recover_address, recover_public_key, sign, verify, PrivateKey,
    PublicKey, Signature,
};
