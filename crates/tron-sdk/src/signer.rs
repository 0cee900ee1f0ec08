//! Signers and in-memory key wallets

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use tron_crypto::{keccak256, public_key_to_address, sign, PrivateKey, PublicKey, Signature};
use tron_primitives::{Address, H256};
use zeroize::Zeroize;

use crate::error::{SdkError, SdkResult};

/// Anything that can produce recoverable signatures for one address
///
/// Hardware or remote signers implement this; [`Wallet`] is the in-memory
/// variant.
pub trait Signer: Send + Sync {
    /// Address whose key produces the signatures
    fn address(&self) -> Address;

    /// Sign a 32-byte digest; `v` is the bare recovery id and `s` is low
    fn sign_digest(&self, digest: &H256) -> SdkResult<Signature>;
}

/// Wallet holding a private key in memory
///
/// Not `Clone`: build a second wallet from the key bytes if one is needed.
/// The address is derived on first use.
pub struct Wallet {
    private_key: PrivateKey,
    address: std::sync::OnceLock<Address>,
}

impl Wallet {
    /// Create a new random wallet
    pub fn new_random() -> Self {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    fn from_signing_key(private_key: PrivateKey) -> Self {
        Self {
            private_key,
            address: std::sync::OnceLock::new(),
        }
    }

    /// Create a wallet from a 32-byte private key
    pub fn from_private_key(key: &[u8; 32]) -> SdkResult<Self> {
        let private_key = SigningKey::from_slice(key)
            .map_err(|e| SdkError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self::from_signing_key(private_key))
    }

    /// Create a wallet from a hex-encoded private key, with or without `0x`
    pub fn from_private_key_hex(hex: &str) -> SdkResult<Self> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let mut bytes = hex::decode(hex)?;
        if bytes.len() != 32 {
            let len = bytes.len();
            bytes.zeroize();
            return Err(SdkError::InvalidPrivateKey(format!(
                "expected 32 bytes, got {}",
                len
            )));
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        bytes.zeroize();

        let result = Self::from_private_key(&key);
        key.zeroize();
        result
    }

    /// Wallet address
    pub fn address(&self) -> Address {
        *self
            .address
            .get_or_init(|| public_key_to_address(self.private_key.verifying_key()))
    }

    /// Public key
    pub fn public_key(&self) -> &PublicKey {
        self.private_key.verifying_key()
    }

    /// Sign a 32-byte digest
    pub fn sign_hash(&self, hash: &H256) -> SdkResult<Signature> {
        sign(hash, &self.private_key).map_err(|e| SdkError::SigningFailed(e.to_string()))
    }

    /// Sign a message with the network's personal-message prefix
    ///
    /// The digest is keccak256 of `"\x19TRON Signed Message:\n{len}" ‖ message`.
    pub fn sign_message(&self, message: &[u8]) -> SdkResult<Signature> {
        let prefix = format!("\x19TRON Signed Message:\n{}", message.len());
        let mut data = prefix.into_bytes();
        data.extend_from_slice(message);
        self.sign_hash(&keccak256(&data))
    }
}

impl Signer for Wallet {
    fn address(&self) -> Address {
        Wallet::address(self)
    }

    fn sign_digest(&self, digest: &H256) -> SdkResult<Signature> {
        self.sign_hash(digest)
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
