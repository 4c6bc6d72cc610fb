use ep_core::{DiseaseState, EpError, PersonId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PopulationError {
    #[error("population parse error: {0}")]
    Parse(String),

    #[error("person ids must be dense 0..{count}: {detail}")]
    NonDenseIds { count: usize, detail: String },

    #[error("{person}: illegal transition {from} → {to}")]
    IllegalTransition {
        person: PersonId,
        from:   DiseaseState,
        to:     DiseaseState,
    },

    #[error("{person}: {name} must be finite and non-negative, got {value}")]
    InvalidMultiplier {
        person: PersonId,
        name:   &'static str,
        value:  f64,
    },

    #[error("column {column} holds {len} entries for {count} persons")]
    ColumnLength {
        column: &'static str,
        len:    usize,
        count:  usize,
    },

    #[error(transparent)]
    Core(#[from] EpError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PopulationResult<T> = Result<T, PopulationError>;
