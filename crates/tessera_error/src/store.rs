//! Persistence store error types.

use derive_getters::Getters;

/// Store error variants.
///
/// Covers the failure modes of the entry-point persistence store. A missing
/// backing file is not an error (the store treats it as an empty document);
/// a malformed document is, and is fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum StoreErrorKind {
    /// Reading or writing the backing file failed.
    #[display("Store I/O error: {_0}")]
    Io(String),

    /// The backing document could not be parsed.
    #[display("Malformed store document: {_0}")]
    Malformed(String),

    /// The in-memory mapping could not be serialized.
    #[display("Store serialization failed: {_0}")]
    Serialize(String),
}

/// Store error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error, Getters)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    kind: StoreErrorKind,
    line: u32,
    file: &'static str,
}

impl StoreError {
    /// Create a new StoreError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
