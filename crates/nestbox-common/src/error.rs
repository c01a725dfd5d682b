//! Unified error types for the nestbox workspace.
//!
//! Every variant maps to a documented process exit code through
//! [`NestboxError::exit_code`], so callers never have to invent one.

use std::path::PathBuf;

use thiserror::Error;

use crate::constants::{
    EXIT_BOOTSTRAP_FAILED, EXIT_EXEC_FAILED, EXIT_EXEC_NOT_FOUND, EXIT_INVALID_ARGUMENTS,
    EXIT_LAUNCH_FAILED, EXIT_WAIT_FAILED,
};

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum NestboxError {
    /// The command line could not be resolved into a launch request.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        /// Description of the malformed input.
        message: String,
    },

    /// The namespace/process creation primitive failed.
    #[error("launch failed: {message}")]
    LaunchFailed {
        /// Underlying OS diagnostic.
        message: String,
    },

    /// A setup step inside the child failed before `execve(2)`.
    #[error("bootstrap failed while {step}: {message}")]
    BootstrapFailed {
        /// Bootstrap step that was being attempted.
        step: &'static str,
        /// Underlying OS diagnostic.
        message: String,
    },

    /// Replacing the child's process image failed.
    #[error("exec of {path} failed: {message}")]
    ExecFailed {
        /// Target executable path.
        path: String,
        /// Whether the target was missing (`ENOENT`/`ENOTDIR`).
        not_found: bool,
        /// Underlying OS diagnostic.
        message: String,
    },

    /// Reaping the isolated child failed.
    #[error("wait failed: {message}")]
    WaitFailed {
        /// Underlying OS diagnostic.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl NestboxError {
    /// Builds an [`NestboxError::InvalidArguments`] from any message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            message: message.into(),
        }
    }

    /// Returns the process exit code reported for this error.
    ///
    /// Configuration problems (`Io`, `Serialization`) are input errors and
    /// share the `InvalidArguments` code.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArguments { .. } | Self::Io { .. } | Self::Serialization { .. } => {
                EXIT_INVALID_ARGUMENTS
            }
            Self::LaunchFailed { .. } => EXIT_LAUNCH_FAILED,
            Self::BootstrapFailed { .. } => EXIT_BOOTSTRAP_FAILED,
            Self::ExecFailed {
                not_found: true, ..
            } => EXIT_EXEC_NOT_FOUND,
            Self::ExecFailed { .. } => EXIT_EXEC_FAILED,
            Self::WaitFailed { .. } => EXIT_WAIT_FAILED,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, NestboxError>;
