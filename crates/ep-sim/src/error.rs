use ep_contact::ContactError;
use ep_core::EpError;
use ep_events::{EventError, MalformedRecordError};
use ep_policy::PolicyError;
use ep_population::PopulationError;
use ep_progression::ProgressionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    /// A bad contact record under the `abort` policy.
    #[error("day {day}: {source}")]
    Malformed {
        day:    u32,
        #[source]
        source: MalformedRecordError,
    },

    #[error(transparent)]
    Core(#[from] EpError),

    #[error(transparent)]
    Population(#[from] PopulationError),

    #[error(transparent)]
    Events(#[from] EventError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Contact(#[from] ContactError),

    #[error(transparent)]
    Progression(#[from] ProgressionError),

    #[error("snapshot serialization: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;
