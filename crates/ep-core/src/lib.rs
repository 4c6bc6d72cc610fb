//! `ep-core` — foundational types for the episim simulation kernel.
//!
//! This crate is a dependency of every other `ep-*` crate.  It intentionally
//! has no `ep-*` dependencies.
//!
//! # What lives here
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`ids`]       | `PersonId`, `HouseholdId`, `ContainerId`, `ActivityType`  |
//! | [`activity`]  | `ActivityRegistry` (tag ↔ `ActivityType`)                 |
//! | [`time`]      | `Day`, `SimCalendar`                                      |
//! | [`rng`]       | `KeyedRng` (addressable draws), `Stream`                  |
//! | [`disease`]   | `DiseaseState` and the progression DAG                    |
//! | [`distr`]     | delay / multiplier distributions, `Sampler`, `Probability`|
//! | [`config`]    | `EpisimConfig` and its sections, validation               |
//! | [`error`]     | `EpError`, `EpResult`                                     |

pub mod activity;
pub mod config;
pub mod disease;
pub mod distr;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use activity::ActivityRegistry;
pub use config::{
    CorrectionEntry, DayRef, EpisimConfig, InfectionConfig, MalformedRecordPolicy, PolicyEntry,
    PopulationConfig, ProgressionConfig, TracingConfig, TransitionRule,
};
pub use disease::DiseaseState;
pub use distr::{AgeBand, DelayDistribution, MultiplierDistribution, Probability, Sampler};
pub use error::{EpError, EpResult};
pub use ids::{ActivityType, ContainerId, HouseholdId, PersonId};
pub use rng::{KeyedRng, Stream};
pub use time::{Day, SimCalendar};
