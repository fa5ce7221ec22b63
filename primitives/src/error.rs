//! Error types for the chainbridge core.
//!
//! `ErrorCode` is the C-visible code written into every `BridgeError`
//! returned across the foreign boundary. `CoreError` is the Rust error used
//! inside the ledger, consensus engine and request bridge; each variant
//! maps to exactly one non-success code.

use std::fmt;

/// Bridge error codes. The repr values are part of the C ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub enum ErrorCode {
    Success = 0,
    NullPointer = 1,
    InvalidUtf8 = 2,
    SerializationError = 3,
    DeserializationError = 4,
    BlockchainError = 5,
    ConsensusError = 6,
    TransactionError = 7,
    StateError = 8,
    InvalidParameter = 9,
    InternalError = 10,
}

impl ErrorCode {
    /// Convert from the i32 representation used by C callers.
    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::NullPointer),
            2 => Some(Self::InvalidUtf8),
            3 => Some(Self::SerializationError),
            4 => Some(Self::DeserializationError),
            5 => Some(Self::BlockchainError),
            6 => Some(Self::ConsensusError),
            7 => Some(Self::TransactionError),
            8 => Some(Self::StateError),
            9 => Some(Self::InvalidParameter),
            10 => Some(Self::InternalError),
            _ => None,
        }
    }

    /// Return the i32 representation of this error code.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns true if this is the `Success` variant.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::NullPointer => write!(f, "Null pointer"),
            Self::InvalidUtf8 => write!(f, "Invalid UTF-8"),
            Self::SerializationError => write!(f, "Serialization error"),
            Self::DeserializationError => write!(f, "Deserialization error"),
            Self::BlockchainError => write!(f, "Blockchain error"),
            Self::ConsensusError => write!(f, "Consensus error"),
            Self::TransactionError => write!(f, "Transaction error"),
            Self::StateError => write!(f, "State error"),
            Self::InvalidParameter => write!(f, "Invalid parameter"),
            Self::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Core error type shared by the ledger, consensus engine and request bridge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A required reference argument was absent.
    #[error("null pointer: {0}")]
    NullPointer(String),

    /// A text argument was not valid UTF-8.
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(String),

    /// Encoding an outgoing buffer failed.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Decoding an incoming buffer failed.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// Ledger or block invariant violation.
    #[error("blockchain error: {0}")]
    Blockchain(String),

    /// Validator-set invariant violation.
    #[error("consensus error: {0}")]
    Consensus(String),

    /// A submitted transaction failed validation.
    #[error("transaction rejected: {0}")]
    Transaction(String),

    /// Requested state is inconsistent or unavailable.
    #[error("state error: {0}")]
    State(String),

    /// A handle, address or other argument is malformed or unknown.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// An internal invariant was violated. Always a bug.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The C-visible code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NullPointer(_) => ErrorCode::NullPointer,
            Self::InvalidUtf8(_) => ErrorCode::InvalidUtf8,
            Self::Serialization(_) => ErrorCode::SerializationError,
            Self::Deserialization(_) => ErrorCode::DeserializationError,
            Self::Blockchain(_) => ErrorCode::BlockchainError,
            Self::Consensus(_) => ErrorCode::ConsensusError,
            Self::Transaction(_) => ErrorCode::TransactionError,
            Self::State(_) => ErrorCode::StateError,
            Self::InvalidParameter(_) => ErrorCode::InvalidParameter,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }
}

/// Convenience result type for the core.
pub type CoreResult<T> = Result<T, CoreError>;
