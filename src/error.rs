//! Error types for ledger_diff

use crate::model::Hash256;
use thiserror::Error;

/// Result type alias for ledger_diff operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading, diffing or summarizing state trees
#[derive(Error, Debug)]
pub enum Error {
    /// A referenced node is absent from the store. Always fatal to the
    /// enclosing diff or fill.
    #[error("Node not found: {0}")]
    NotFound(Hash256),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    #[error("Corruption detected: {0}")]
    Corruption(String),

    #[error("Invalid snapshot file: {0}")]
    InvalidFile(String),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Snapshot is opened read-only")]
    ReadOnly,

    #[error("Summary requested before a successful fill")]
    PrematureSummary,

    #[error("Tree depth {depth} exceeds limit of {limit}")]
    DepthExceeded { depth: usize, limit: usize },

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// True when the error is a missing node rather than a store failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
