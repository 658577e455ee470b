//! Error types for the host platform port

use thiserror::Error;

/// Adapter error enumeration
#[derive(Debug, Error, Clone)]
pub enum AdapterError {
    /// No foreground object could be obtained from the host
    #[error("no foreground object available")]
    NoForeground,

    /// A fixture tree document could not be decoded
    #[error("fixture decode failed: {0}")]
    Decode(String),

    /// Internal error
    #[error("internal adapter error: {0}")]
    Internal(String),
}

impl AdapterError {
    pub fn internal(reason: impl Into<String>) -> Self {
        AdapterError::Internal(reason.into())
    }
}
