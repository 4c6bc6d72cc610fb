//! `DaySummary` — the per-day aggregate emitted by the runner.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use ep_core::{Day, DiseaseState};
use ep_tracing::TracingStats;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub day:  Day,
    pub date: NaiveDate,

    /// Head-count per disease state at the end of the day, indexed by
    /// `DiseaseState::rank`.
    pub state_counts: [u64; DiseaseState::COUNT],

    /// Persons moved to `exposed` today, initial seeds included.
    pub new_infections: u64,
    /// Contact infections per activity type, in registry order.  Seeds are
    /// not attributed to any activity.
    pub infections_by_activity: Vec<u64>,

    /// Quarantined at the end of the day.
    pub quarantined: u64,
    /// Released at the start of the day.
    pub released: u64,
    pub tracing: TracingStats,

    /// Events that reached the contact model.
    pub admitted_events: u64,
    /// Events removed by the activity policy.
    pub restricted_events: u64,
    /// Events dropped because a participant was hospitalised or quarantined.
    pub absent_events: u64,
    /// Malformed records skipped under the `skip` policy.
    pub skipped_records: u64,
}

impl DaySummary {
    #[inline]
    pub fn count(&self, state: DiseaseState) -> u64 {
        self.state_counts[state.rank()]
    }

    /// Persons ever infected (everyone not susceptible).
    pub fn cumulative_infected(&self) -> u64 {
        self.state_counts.iter().sum::<u64>() - self.count(DiseaseState::Susceptible)
    }

    /// Currently contagious (with or without symptoms).
    pub fn infectious(&self) -> u64 {
        self.count(DiseaseState::Contagious) + self.count(DiseaseState::Symptomatic)
    }
}
