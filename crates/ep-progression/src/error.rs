use ep_core::{DiseaseState, EpError};
use ep_population::PopulationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgressionError {
    #[error("transition {from} → {to} is not an edge of the progression graph")]
    IllegalEdge { from: DiseaseState, to: DiseaseState },

    #[error("no transition configured out of reachable state {0}")]
    MissingTransition(DiseaseState),

    #[error("transition {from} → {to} configured twice")]
    DuplicateRule { from: DiseaseState, to: DiseaseState },

    #[error("more than one transition out of {0} without a probability")]
    AmbiguousDefault(DiseaseState),

    #[error("branch probabilities out of {state} sum to {sum} at age {age} (expected {expected})")]
    ProbabilitySum {
        state:    DiseaseState,
        age:      u8,
        sum:      f64,
        expected: &'static str,
    },

    #[error(transparent)]
    Population(#[from] PopulationError),

    #[error(transparent)]
    Core(#[from] EpError),
}

pub type ProgressionResult<T> = Result<T, ProgressionError>;
