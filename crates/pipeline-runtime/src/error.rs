//! Runtime error types and status handling.
//!
//! The pipeline runtime reports failures as errno-style codes. This module
//! turns those raw codes into a typed status and a `Result`-friendly error.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Status codes returned by runtime calls.
///
/// Values follow the Linux errno numbering used by eBPF tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeStatus {
    Success,
    NoEntry,
    Io,
    NoMemory,
    Exists,
    InvalidArgument,
    NotSupported,
    Other(i32),
}

impl RuntimeStatus {
    /// Creates a status from a raw return value. Negative values are treated
    /// as negated errno.
    pub fn from_raw(code: i32) -> Self {
        match code.unsigned_abs() {
            0 => RuntimeStatus::Success,
            2 => RuntimeStatus::NoEntry,
            5 => RuntimeStatus::Io,
            12 => RuntimeStatus::NoMemory,
            17 => RuntimeStatus::Exists,
            22 => RuntimeStatus::InvalidArgument,
            95 => RuntimeStatus::NotSupported,
            _ => RuntimeStatus::Other(code),
        }
    }

    pub fn as_raw(&self) -> i32 {
        match self {
            RuntimeStatus::Success => 0,
            RuntimeStatus::NoEntry => 2,
            RuntimeStatus::Io => 5,
            RuntimeStatus::NoMemory => 12,
            RuntimeStatus::Exists => 17,
            RuntimeStatus::InvalidArgument => 22,
            RuntimeStatus::NotSupported => 95,
            RuntimeStatus::Other(code) => *code,
        }
    }

    pub fn is_success(&self) -> bool {
        *self == RuntimeStatus::Success
    }

    /// Converts to a Result, tagging failures with the name of the call.
    pub fn into_result(self, call: &str) -> RuntimeResult<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(RuntimeError::status(call, self))
        }
    }
}

impl fmt::Display for RuntimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeStatus::Success => write!(f, "SUCCESS"),
            RuntimeStatus::NoEntry => write!(f, "ENOENT"),
            RuntimeStatus::Io => write!(f, "EIO"),
            RuntimeStatus::NoMemory => write!(f, "ENOMEM"),
            RuntimeStatus::Exists => write!(f, "EEXIST"),
            RuntimeStatus::InvalidArgument => write!(f, "EINVAL"),
            RuntimeStatus::NotSupported => write!(f, "EOPNOTSUPP"),
            RuntimeStatus::Other(code) => write!(f, "errno {}", code),
        }
    }
}

/// Error type for runtime operations.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    /// A runtime call returned a failure status.
    #[error("{call} failed: {status}")]
    Status { call: String, status: RuntimeStatus },

    /// The pipeline image could not be staged for loading.
    #[error("Failed to stage pipeline object at {}: {message}", path.display())]
    Staging { path: PathBuf, message: String },
}

impl RuntimeError {
    pub fn status(call: impl Into<String>, status: RuntimeStatus) -> Self {
        RuntimeError::Status {
            call: call.into(),
            status,
        }
    }

    pub fn no_entry(call: impl Into<String>) -> Self {
        Self::status(call, RuntimeStatus::NoEntry)
    }

    pub fn exists(call: impl Into<String>) -> Self {
        Self::status(call, RuntimeStatus::Exists)
    }

    pub fn invalid_argument(call: impl Into<String>) -> Self {
        Self::status(call, RuntimeStatus::InvalidArgument)
    }

    pub fn staging(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        RuntimeError::Staging {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the runtime status if this is a Status error.
    pub fn runtime_status(&self) -> Option<RuntimeStatus> {
        match self {
            RuntimeError::Status { status, .. } => Some(*status),
            RuntimeError::Staging { .. } => None,
        }
    }

    /// Returns true if the runtime reported that the object does not exist.
    pub fn is_no_entry(&self) -> bool {
        self.runtime_status() == Some(RuntimeStatus::NoEntry)
    }
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Extension trait for converting raw return codes.
pub trait RuntimeStatusExt {
    fn to_result(self, call: &str) -> RuntimeResult<()>;
}

impl RuntimeStatusExt for i32 {
    fn to_result(self, call: &str) -> RuntimeResult<()> {
        RuntimeStatus::from_raw(self).into_result(call)
    }
}
