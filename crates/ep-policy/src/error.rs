use ep_core::EpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("policy entry {index}: remaining fraction {fraction} outside [0, 1]")]
    FractionOutOfRange { index: usize, fraction: f64 },

    #[error(transparent)]
    Core(#[from] EpError),
}

pub type PolicyResult<T> = Result<T, PolicyError>;
