//! Structured error taxonomy for the store crate, mirroring the nested, per-category
//! `thiserror` enums the engine's error module uses: one variant family per failure mode,
//! composed into a single top-level enum via `#[from]` so callers can `?`-propagate
//! regardless of which category actually failed.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

/// Schema parse failure. Carries the full list of issues rather than just the first one,
/// so a caller building a form or CLI can report every problem at once.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("validation failed: {issues:?}")]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError { issues: vec![ValidationIssue { path: path.into(), message: message.into() }] }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Item with id {id} already exists")]
pub struct DuplicateIdError {
    pub id: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("no item with id {id}")]
pub struct MissingIdError {
    pub id: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MigrationError {
    #[error("missing migration from v{from} to v{to}")]
    MissingStep { from: u32, to: u32 },
    #[error("migration step to v{version} produced invalid data: {source}")]
    ValidationFailed { version: u32, source: ValidationError },
    #[error("cannot migrate backwards from v{from} to v{to}")]
    Backwards { from: u32, to: u32 },
}

/// Top-level error type for every fallible store API. "Throw" in the language-neutral spec
/// maps to "return `Err`" here, never to `panic!` — the throwing and `try*` write APIs
/// return this same type; see the doc comments on `Collection::insert`/`update`/`delete`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    DuplicateId(#[from] DuplicateIdError),
    #[error(transparent)]
    MissingId(#[from] MissingIdError),
    #[error(transparent)]
    Migration(#[from] MigrationError),
}

impl StoreError {
    /// Structured issue list, when this is a validation failure — `None` otherwise. Mirrors
    /// the `diagnostic()` accessor pattern used by the engine crate's error types.
    pub fn diagnostic(&self) -> Option<&[ValidationIssue]> {
        match self {
            StoreError::Validation(v) => Some(&v.issues),
            _ => None,
        }
    }
}
