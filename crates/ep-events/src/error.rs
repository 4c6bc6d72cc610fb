use ep_core::EpError;
use thiserror::Error;

/// One record of the contact stream that could not be parsed.
///
/// `line` is 1-based and counts the header; `0` means unknown.  The runner
/// decides whether to skip the record or abort the run.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("malformed contact record at line {line}: {reason}")]
pub struct MalformedRecordError {
    pub line:   u64,
    pub reason: String,
}

impl MalformedRecordError {
    pub fn new(line: u64, reason: impl Into<String>) -> Self {
        Self { line, reason: reason.into() }
    }
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error(transparent)]
    Malformed(#[from] MalformedRecordError),

    #[error("contact stream header: {0}")]
    Header(String),

    #[error("contact stream error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Core(#[from] EpError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type EventResult<T> = Result<T, EventError>;
