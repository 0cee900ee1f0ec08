//! Recoverable ECDSA over secp256k1

use std::cmp::Ordering;

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};
use tron_primitives::{Address, H256};

use crate::{keccak256, CryptoError};

/// n/2 for secp256k1
/// n = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
const SECP256K1_N_DIV_2: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D,
    0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// secp256k1 group order n
const SECP256K1_N: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B,
    0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// 65-byte recoverable signature `r ‖ s ‖ v`
///
/// `v` is the bare recovery id (0 or 1); no chain id or legacy offset is
/// added. `s` is always in the lower half of the curve order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// r component
    pub r: [u8; 32],
    /// s component
    pub s: [u8; 32],
    /// recovery id (0 or 1)
    pub v: u8,
}

/// secp256k1 public key
pub type PublicKey = VerifyingKey;

/// secp256k1 private key
pub type PrivateKey = SigningKey;

impl Signature {
    /// Encoded length
    pub const LEN: usize = 65;

    /// Create signature from r, s, v components
    pub fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Signature { r, s, v }
    }

    /// Recovery id; signatures produced elsewhere with a 27/28 offset are accepted
    pub fn recovery_id(&self) -> u8 {
        if self.v >= 27 {
            self.v - 27
        } else {
            self.v
        }
    }

    /// `r ‖ s ‖ v`
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }

    /// Parse from `r ‖ s ‖ v`
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != Self::LEN {
            return Err(CryptoError::InvalidSignatureLength(bytes.len()));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Signature { r, s, v: bytes[64] })
    }

    /// Whether `s <= n/2`
    pub fn is_low_s(&self) -> bool {
        compare_bytes(&self.s, &SECP256K1_N_DIV_2) != Ordering::Greater
    }

    fn to_k256(&self) -> Result<K256Signature, CryptoError> {
        let r: k256::FieldBytes = self.r.into();
        let s: k256::FieldBytes = self.s.into();
        K256Signature::from_scalars(r, s).map_err(|e| CryptoError::InvalidSignature(e.to_string()))
    }
}

/// Compare two 32-byte big-endian integers
fn compare_bytes(a: &[u8; 32], b: &[u8; 32]) -> Ordering {
    a.iter().cmp(b.iter())
}

/// n - s
fn subtract_from_n(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: u16 = 0;

    for i in (0..32).rev() {
        let diff = (SECP256K1_N[i] as u16)
            .wrapping_sub(s[i] as u16)
            .wrapping_sub(borrow);
        result[i] = diff as u8;
        borrow = u16::from(diff > 255);
    }

    result
}

/// Sign a 32-byte digest, normalising to low-s
pub fn sign(digest: &H256, private_key: &PrivateKey) -> Result<Signature, CryptoError> {
    let (signature, mut recovery_id) = private_key
        .sign_prehash_recoverable(digest.as_bytes())
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

    let r: [u8; 32] = signature.r().to_bytes().into();
    let mut s: [u8; 32] = signature.s().to_bytes().into();

    // s > n/2: use n - s and flip the parity bit
    if compare_bytes(&s, &SECP256K1_N_DIV_2) == Ordering::Greater {
        s = subtract_from_n(&s);
        recovery_id = RecoveryId::try_from(recovery_id.to_byte() ^ 1)
            .map_err(|_| CryptoError::SigningFailed("recovery id out of range".to_string()))?;
    }

    Ok(Signature {
        r,
        s,
        v: recovery_id.to_byte(),
    })
}

/// Verify a signature against a digest and public key; high-s is rejected
pub fn verify(
    digest: &H256,
    signature: &Signature,
    public_key: &PublicKey,
) -> Result<bool, CryptoError> {
    if !signature.is_low_s() {
        return Ok(false);
    }
    let k256_sig = signature.to_k256()?;
    Ok(public_key.verify_prehash(digest.as_bytes(), &k256_sig).is_ok())
}

/// Recover the signing public key
pub fn recover_public_key(digest: &H256, signature: &Signature) -> Result<PublicKey, CryptoError> {
    let k256_sig = signature.to_k256()?;
    let id = signature.recovery_id();
    let recovery_id = RecoveryId::try_from(id).map_err(|_| CryptoError::InvalidRecoveryId(id))?;

    VerifyingKey::recover_from_prehash(digest.as_bytes(), &k256_sig, recovery_id)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))
}

/// Recover the signer's network address
pub fn recover_address(digest: &H256, signature: &Signature) -> Result<Address, CryptoError> {
    recover_public_key(digest, signature).map(|pk| public_key_to_address(&pk))
}

/// Derive the network address of a public key
///
/// Keccak-256 over the 64-byte uncompressed point (leading `0x04` dropped);
/// the last 20 bytes get the mainnet prefix.
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);

    let mut tail = [0u8; 20];
    tail.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_evm_bytes(tail)
}
