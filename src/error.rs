//! Error types for Flowsync.
//!
//! All errors in Flowsync are represented by the `FlowsyncError` enum,
//! which keeps the failure kinds apart so callers can tell a missing
//! workflow from a refused connection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Flowsync operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum FlowsyncError {
    /// Connection refused, DNS failure, timeout.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote service answered with a non-2xx status.
    #[error("server returned status {status}: {body}")]
    Protocol {
        status: u16,
        body: String,
    },

    /// Response body is not the expected JSON.
    #[error("decode error: {0}")]
    Decode(String),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Local file missing, unreadable, or holding invalid JSON.
    #[error("local io error: {0}")]
    LocalIo(String),

    /// Input rejected before any request was issued.
    #[error("invalid input: {0}")]
    Invalid(String),

    /// Configuration parsing or validation errors.
    #[error("config error: {0}")]
    Config(String),
}

impl FlowsyncError {
    /// Returns true for [`FlowsyncError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, FlowsyncError::NotFound(_))
    }
}

impl From<std::io::Error> for FlowsyncError {
    fn from(error: std::io::Error) -> Self {
        FlowsyncError::LocalIo(error.to_string())
    }
}

impl From<reqwest::Error> for FlowsyncError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            FlowsyncError::Decode(error.to_string())
        } else if let Some(status) = error.status() {
            FlowsyncError::Protocol {
                status: status.as_u16(),
                body: error.to_string(),
            }
        } else if error.is_builder() {
            FlowsyncError::Invalid(error.to_string())
        } else {
            FlowsyncError::Transport(error.to_string())
        }
    }
}

impl From<globset::Error> for FlowsyncError {
    fn from(error: globset::Error) -> Self {
        FlowsyncError::Config(error.to_string())
    }
}
