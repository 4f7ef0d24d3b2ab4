//! Error types for the carefind pipeline.
//!
//! All fallible operations return `CarefindResult<T>`. Recoverable per-row
//! problems (a CSV row that is too short, a duplicate name in an import) are
//! reported as diagnostics by the stage that found them; the variants here are
//! what reaches a caller when an operation as a whole cannot proceed.

use thiserror::Error;

/// The unified error type for carefind.
#[derive(Debug, Error)]
pub enum CarefindError {
    /// The input has no usable content (e.g. a CSV without data rows).
    ///
    /// Fatal to the operation that received it: nothing is merged.
    #[error("malformed input: {reason}")]
    MalformedInput { reason: String },

    /// A facility with the same name (case-insensitive) already exists.
    #[error("a facility named '{name}' already exists")]
    DuplicateRecord { name: String },

    /// The live-info collaborator failed. Prior facility state is kept.
    #[error("live info fetch failed: {reason}")]
    NetworkFailure { reason: String },

    /// A required field is missing or invalid on add/edit.
    #[error("validation failed for '{field}': {reason}")]
    ValidationFailure { field: String, reason: String },

    /// No facility with the given id exists in the store.
    #[error("facility '{id}' not found")]
    NotFound { id: String },

    /// The persistence collaborator could not read or write a snapshot.
    #[error("storage failure: {reason}")]
    StorageFailure { reason: String },

    /// A configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A bulk operation was cancelled before it finished.
    #[error("operation cancelled")]
    Cancelled,
}

impl CarefindError {
    /// Shorthand for a `ValidationFailure` on `field`.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationFailure {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for the error kinds the pipeline degrades around instead of
    /// aborting (duplicates, network and validation failures).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DuplicateRecord { .. }
                | Self::NetworkFailure { .. }
                | Self::ValidationFailure { .. }
        )
    }
}

/// Convenience alias used throughout the carefind crates.
pub type CarefindResult<T> = Result<T, CarefindError>;
