//! Error types for bindflow operations.
//!
//! This module provides the main error type [`BindflowError`]. Every error is
//! terminal for the invocation that raised it; nothing here is retried.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::render::RenderError;

/// The main error type for bindflow operations.
#[derive(Debug, Error)]
pub enum BindflowError {
    /// Bad caller input, detected before any side effect.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced file or directory does not exist.
    #[error("Not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error while {operation} {}: {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("No results found for exchange: {exchange}")]
    NoResults { exchange: String },
}

impl BindflowError {
    /// Create a new `Validation` error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new `NotFound` error for `path`.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a new `Io` error describing what was attempted on `path`.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_message_names_path_and_operation() {
        let err = BindflowError::io(
            "writing",
            "/tmp/out/flow.json",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(
            err.to_string(),
            "I/O error while writing /tmp/out/flow.json: denied"
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = BindflowError::not_found("/tmp/out/flow.mmd");
        assert_eq!(err.to_string(), "Not found: /tmp/out/flow.mmd");
    }
}
