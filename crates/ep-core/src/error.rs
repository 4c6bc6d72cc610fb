//! Kernel-wide base error type.
//!
//! Sub-crates define their own error enums and wrap `EpError` as one variant
//! via `#[from]`, so configuration problems surface with a single message
//! format wherever they are detected.

use thiserror::Error;

use crate::PersonId;

/// The top-level error type for `ep-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum EpError {
    #[error("person {0} not found")]
    PersonNotFound(PersonId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown activity type {name:?} referenced by {context}")]
    UnknownActivity { name: String, context: String },

    #[error("invalid distribution: {0}")]
    Distribution(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `ep-core`.
pub type EpResult<T> = Result<T, EpError>;
