//! `SimSnapshot` — everything needed to resume a run at a day boundary.
//!
//! Keyed random draws have no cursor, so the seed is the whole RNG state.
//! The transition queue is not stored: it is rebuilt from the pending
//! transition kept per person.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use ep_core::{Day, EpisimConfig};
use ep_population::PersonStore;
use ep_tracing::TracingState;

use crate::SimResult;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimSnapshot {
    /// The first day not yet simulated.
    pub next_day:           Day,
    pub seed:               u64,
    /// SHA-256 of the serialized configuration, hex.
    pub config_fingerprint: String,
    pub people:             PersonStore,
    pub tracing:            TracingState,
}

impl SimSnapshot {
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Hex SHA-256 of the JSON form of `config`.
pub fn config_fingerprint(config: &EpisimConfig) -> SimResult<String> {
    let bytes = serde_json::to_vec(config)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}
