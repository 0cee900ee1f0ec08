//! TRON network address (21 bytes: 1-byte prefix + 20-byte account hash)

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Network prefix byte of production (and public test) network addresses
pub const MAINNET_PREFIX: u8 = 0x41;

/// Prefixes accepted when parsing
const KNOWN_PREFIXES: [u8; 1] = [MAINNET_PREFIX];

/// Length of the base58check checksum suffix
const CHECKSUM_LEN: usize = 4;

/// Address parsing error
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid base58 string
    #[error("invalid base58 string: {0}")]
    InvalidBase58(String),
    /// Invalid length
    #[error("invalid address length: expected 21 bytes, got {0}")]
    InvalidLength(usize),
    /// Checksum mismatch
    #[error("base58check checksum mismatch")]
    InvalidChecksum,
    /// Unknown network prefix
    #[error("unknown address prefix: 0x{0:02x}")]
    UnknownPrefix(u8),
}

/// 21-byte network address
///
/// The first byte is the network prefix ([`MAINNET_PREFIX`]); the remaining
/// 20 bytes are the tail of the Keccak-256 hash of the account public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 21]);

impl Address {
    /// Size of address in bytes
    pub const LEN: usize = 21;

    /// Create address from bytes, validating the prefix
    pub fn from_bytes(bytes: [u8; 21]) -> Result<Self, AddressError> {
        if !KNOWN_PREFIXES.contains(&bytes[0]) {
            return Err(AddressError::UnknownPrefix(bytes[0]));
        }
        Ok(Address(bytes))
    }

    /// Create address from slice
    ///
    /// Accepts the 21-byte network form, or a bare 20-byte account hash which
    /// gets the mainnet prefix.
    pub fn from_slice(slice: &[u8]) -> Result<Self, AddressError> {
        match slice.len() {
            21 => {
                let mut bytes = [0u8; 21];
                bytes.copy_from_slice(slice);
                Self::from_bytes(bytes)
            }
            20 => {
                let mut tail = [0u8; 20];
                tail.copy_from_slice(slice);
                Ok(Self::from_evm_bytes(tail))
            }
            n => Err(AddressError::InvalidLength(n)),
        }
    }

    /// Build a mainnet address from a 20-byte account hash
    pub fn from_evm_bytes(tail: [u8; 20]) -> Self {
        let mut bytes = [0u8; 21];
        bytes[0] = MAINNET_PREFIX;
        bytes[1..].copy_from_slice(&tail);
        Address(bytes)
    }

    /// Parse address from hex string
    ///
    /// Accepts `41…` / `0x41…` (21 bytes) and `0x…` (20 bytes, prefix added).
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Parse address from base58check string
    pub fn from_base58(s: &str) -> Result<Self, AddressError> {
        let decoded = bs58::decode(s)
            .into_vec()
            .map_err(|e| AddressError::InvalidBase58(e.to_string()))?;
        if decoded.len() != Self::LEN + CHECKSUM_LEN {
            return Err(AddressError::InvalidLength(
                decoded.len().saturating_sub(CHECKSUM_LEN),
            ));
        }
        let (payload, checksum) = decoded.split_at(Self::LEN);
        if checksum != double_sha256_checksum(payload) {
            return Err(AddressError::InvalidChecksum);
        }
        let mut bytes = [0u8; 21];
        bytes.copy_from_slice(payload);
        Self::from_bytes(bytes)
    }

    /// Get as byte array
    pub fn as_bytes(&self) -> &[u8; 21] {
        &self.0
    }

    /// Network prefix byte
    pub fn prefix(&self) -> u8 {
        self.0[0]
    }

    /// The 20-byte account hash, as used inside contract call data
    pub fn evm_bytes(&self) -> [u8; 20] {
        let mut tail = [0u8; 20];
        tail.copy_from_slice(&self.0[1..]);
        tail
    }

    /// Check if the account hash is all zeros
    pub fn is_zero(&self) -> bool {
        self.0[1..].iter().all(|b| *b == 0)
    }

    /// Lowercase hex of the 21 bytes (42 characters, no `0x`)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Base58check encoding
    pub fn to_base58(&self) -> String {
        let mut payload = Vec::with_capacity(Self::LEN + CHECKSUM_LEN);
        payload.extend_from_slice(&self.0);
        payload.extend_from_slice(&double_sha256_checksum(&self.0));
        bs58::encode(payload).into_string()
    }
}

/// First four bytes of SHA-256(SHA-256(payload))
fn double_sha256_checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let first = Sha256::digest(payload);
    let second = Sha256::digest(first);
    let mut checksum = [0u8; CHECKSUM_LEN];
    checksum.copy_from_slice(&second[..CHECKSUM_LEN]);
    checksum
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_base58())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Accepts base58check, or hex in any form [`Address::from_hex`] accepts
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let looks_hex = s.starts_with("0x")
            || (s.len() == 42 && s.chars().all(|c| c.is_ascii_hexdigit()));
        if looks_hex {
            Self::from_hex(s)
        } else {
            Self::from_base58(s)
        }
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = AddressError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(slice)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Address {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_base58())
        }
    }

    impl<'de> Deserialize<'de> for Address {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        }
    }
}
