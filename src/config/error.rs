//! Error definitions for the configuration module.

use thiserror::Error;

/// Failure modes of tree mutation and persistence.
///
/// A mutation that fails validation leaves both the in-memory tree and the
/// persisted document untouched. A corrupt document is reported, never
/// silently replaced.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required field was empty on an add operation.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// An index did not address an existing entry.
    #[error("no {entity} at index {index}")]
    IndexOutOfRange {
        entity: &'static str,
        index: usize,
    },

    /// Reading or writing the panel document failed.
    #[error("panel document I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document exists but does not parse as a panel tree.
    ///
    /// Raised for truncated or hand-edited files and for documents in the
    /// legacy shape without endpoint identifiers. Distinct from a missing
    /// document, which simply opens as an empty tree.
    #[error("panel document is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
