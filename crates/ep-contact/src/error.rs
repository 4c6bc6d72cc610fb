use ep_core::EpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("calibration parameter must be finite and non-negative, got {0}")]
    Calibration(f64),

    #[error("activity correction entry {index}: factor {factor} must be finite and non-negative")]
    Correction { index: usize, factor: f64 },

    #[error(transparent)]
    Core(#[from] EpError),
}

pub type ContactResult<T> = Result<T, ContactError>;
