//! Error types for the session layer

use thiserror::Error;

use ax_adapter::AdapterError;

/// Session error enumeration
#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// The host tree could not be walked at all
    #[error("tree walk failed: {0}")]
    Tree(#[from] AdapterError),
}
