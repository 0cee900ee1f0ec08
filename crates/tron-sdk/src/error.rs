//! SDK error types

use thiserror::Error;
use tron_proto::ResponseCode;

use crate::pool::PoolError;

/// SDK error type
///
/// `Clone` so a transaction workflow can keep its terminal cause and hand it
/// back from every later call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SdkError {
    /// Address parse/length/checksum failure
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Amount non-positive where positive is required, too precise, or too large
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Contradictory or malformed argument
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Bad endpoint, pool sizing, or timeout
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Workflow operation not allowed in the current state
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Could not obtain a pooled connection
    #[error("{op}: connection unavailable: {source}")]
    RpcDial {
        /// Operation label
        op: &'static str,
        /// Pool failure
        source: PoolError,
    },

    /// HTTP/2 or framing failure during a call
    #[error("{op}: transport error ({code:?}): {message}")]
    RpcTransport {
        /// Operation label
        op: &'static str,
        /// gRPC status code
        code: tonic::Code,
        /// Status message
        message: String,
    },

    /// Node refused to build a transaction
    #[error("transaction build rejected ({}): {message}", .code.as_str_name())]
    TxBuild {
        /// Node response code
        code: ResponseCode,
        /// Node message, verbatim
        message: String,
    },

    /// Node accepted the broadcast request but refused to enqueue
    #[error("broadcast rejected ({}): {message}", .code.as_str_name())]
    BroadcastRejected {
        /// Node response code
        code: ResponseCode,
        /// Node message, verbatim
        message: String,
    },

    /// Execution failed in simulation or on chain
    #[error("transaction reverted: {message}")]
    TxReverted {
        /// Transaction ID (hex), when one exists
        tx_id: Option<String>,
        /// Revert reason or execution status
        message: String,
    },

    /// Method not present in the interface
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    /// Wrong number of arguments
    #[error("{method}: expected {expected} arguments, got {got}")]
    ArityMismatch {
        /// Method signature
        method: String,
        /// Declared input count
        expected: usize,
        /// Supplied argument count
        got: usize,
    },

    /// Argument cannot be converted to the declared type
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Declared type
        expected: String,
        /// Description of the supplied value
        got: String,
    },

    /// Value outside the declared width
    #[error("value {value} does not fit {kind}")]
    EncodeOverflow {
        /// Declared type
        kind: String,
        /// Offending value
        value: String,
    },

    /// Data shorter than the declared tuple
    #[error("insufficient data: need {need} bytes, have {have}")]
    DecodeShort {
        /// Required length
        need: usize,
        /// Available length
        have: usize,
    },

    /// Data present but malformed (bad UTF-8, bad offset, dirty padding)
    #[error("invalid encoded data: {0}")]
    DecodeInvalid(String),

    /// Type string not supported by the codec
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// Interface description could not be parsed
    #[error("invalid abi: {0}")]
    InvalidAbi(String),

    /// Caller cancelled the context
    #[error("operation cancelled")]
    Cancelled,

    /// Context deadline elapsed
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Invalid private key
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Signing failed
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// Invalid hex string
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Node-reported transaction ID differs from the locally computed one
    #[error("transaction id mismatch: local {local}, node {node}")]
    TxIdMismatch {
        /// Locally computed ID (hex)
        local: String,
        /// ID reported by the node (hex)
        node: String,
    },

    /// JSON (de)serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for SDK operations
pub type SdkResult<T> = Result<T, SdkError>;

impl From<hex::FromHexError> for SdkError {
    fn from(e: hex::FromHexError) -> Self {
        SdkError::InvalidHex(e.to_string())
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::Serialization(e.to_string())
    }
}

impl From<tron_crypto::CryptoError> for SdkError {
    fn from(e: tron_crypto::CryptoError) -> Self {
        match e {
            tron_crypto::CryptoError::InvalidPrivateKey => {
                SdkError::InvalidPrivateKey(e.to_string())
            }
            other => SdkError::SigningFailed(other.to_string()),
        }
    }
}

impl From<tron_primitives::AddressError> for SdkError {
    fn from(e: tron_primitives::AddressError) -> Self {
        SdkError::InvalidAddress(e.to_string())
    }
}

impl From<tron_primitives::PrimitiveError> for SdkError {
    fn from(e: tron_primitives::PrimitiveError) -> Self {
        use tron_primitives::PrimitiveError;
        match e {
            PrimitiveError::Address(inner) => SdkError::InvalidAddress(inner.to_string()),
            PrimitiveError::Hash(inner) => SdkError::InvalidHex(inner.to_string()),
            PrimitiveError::Amount(msg) => SdkError::InvalidAmount(msg),
        }
    }
}

impl SdkError {
    /// Whether this error came from the caller's context rather than the node
    pub fn is_context_error(&self) -> bool {
        matches!(self, SdkError::Cancelled | SdkError::DeadlineExceeded)
    }
}
