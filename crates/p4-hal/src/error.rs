//! Error types for HAL operations.
//!
//! Every failure the HAL reports carries one of the canonical [`ErrorCode`]s
//! that P4Runtime clients expect. Runtime failures are folded into
//! `ERR_INTERNAL` unless an operation maps them more precisely.

use pipeline_runtime::RuntimeError;
use std::fmt;
use thiserror::Error;

/// Result type alias for HAL operations.
pub type HalResult<T> = Result<T, HalError>;

/// Canonical error codes reported to P4Runtime clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidParam,
    Unimplemented,
    NotFound,
    Internal,
    InvalidP4Info,
    AtLeastOneOperFailed,
    OperNotSupported,
    NotInitialized,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidParam => "ERR_INVALID_PARAM",
            ErrorCode::Unimplemented => "ERR_UNIMPLEMENTED",
            ErrorCode::NotFound => "ERR_NOT_FOUND",
            ErrorCode::Internal => "ERR_INTERNAL",
            ErrorCode::InvalidP4Info => "ERR_INVALID_P4_INFO",
            ErrorCode::AtLeastOneOperFailed => "ERR_AT_LEAST_ONE_OPER_FAILED",
            ErrorCode::OperNotSupported => "ERR_OPER_NOT_SUPPORTED",
            ErrorCode::NotInitialized => "ERR_NOT_INITIALIZED",
        };
        write!(f, "{}", s)
    }
}

/// Errors that can occur in the HAL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    /// Malformed or semantically inconsistent request.
    #[error("Invalid parameter: {message}")]
    InvalidParam { message: String },

    /// Entity kind or operation not handled.
    #[error("Unimplemented: {what}")]
    Unimplemented { what: String },

    /// Unknown node, or a lookup the runtime could not resolve.
    #[error("Not found: {item}")]
    NotFound { item: String },

    /// A runtime call or response write failed.
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// The pipeline description is invalid or disagrees with the loaded pipeline.
    #[error("Invalid P4Info: {message}")]
    InvalidP4Info { message: String },

    /// Aggregate result of a batch with at least one failed element.
    #[error("One or more operations failed")]
    AtLeastOneOperFailed,

    #[error("Operation not supported: {message}")]
    OperNotSupported { message: String },

    /// The node has no pipeline to serve the request.
    #[error("Not initialized: {message}")]
    NotInitialized { message: String },
}

impl HalError {
    pub fn code(&self) -> ErrorCode {
        match self {
            HalError::InvalidParam { .. } => ErrorCode::InvalidParam,
            HalError::Unimplemented { .. } => ErrorCode::Unimplemented,
            HalError::NotFound { .. } => ErrorCode::NotFound,
            HalError::Internal { .. } => ErrorCode::Internal,
            HalError::InvalidP4Info { .. } => ErrorCode::InvalidP4Info,
            HalError::AtLeastOneOperFailed => ErrorCode::AtLeastOneOperFailed,
            HalError::OperNotSupported { .. } => ErrorCode::OperNotSupported,
            HalError::NotInitialized { .. } => ErrorCode::NotInitialized,
        }
    }

    pub fn invalid_param(message: impl Into<String>) -> Self {
        HalError::InvalidParam {
            message: message.into(),
        }
    }

    pub fn unimplemented(what: impl Into<String>) -> Self {
        HalError::Unimplemented { what: what.into() }
    }

    pub fn not_found(item: impl Into<String>) -> Self {
        HalError::NotFound { item: item.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        HalError::Internal {
            message: message.into(),
        }
    }

    pub fn invalid_p4info(message: impl Into<String>) -> Self {
        HalError::InvalidP4Info {
            message: message.into(),
        }
    }

    pub fn oper_not_supported(message: impl Into<String>) -> Self {
        HalError::OperNotSupported {
            message: message.into(),
        }
    }

    pub fn not_initialized(message: impl Into<String>) -> Self {
        HalError::NotInitialized {
            message: message.into(),
        }
    }
}

impl From<RuntimeError> for HalError {
    fn from(err: RuntimeError) -> Self {
        HalError::internal(err.to_string())
    }
}
