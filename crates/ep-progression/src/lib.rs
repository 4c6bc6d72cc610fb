//! `ep-progression` — the per-person disease state machine.
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`model`]  | `ProgressionModel` trait, `ConfiguredProgression`          |
//! | [`queue`]  | `TransitionQueue` (`BTreeMap<Day, Vec<PersonId>>`)          |
//! | [`engine`] | `ProgressionEngine` (`infect`, `advance`), `TransitionRecord` |
//! | [`error`]  | `ProgressionError`, `ProgressionResult<T>`                 |
//!
//! # Day cycle (summary)
//!
//! ```text
//! infect(p, d)   susceptible → exposed on d, next transition scheduled
//! advance(d)     every person due ≤ d moves one or more states forward
//! ```
//!
//! Every state a person enters gets at most one pending transition, stored in
//! `PersonStore::next_transition`; the queue only indexes it by day.

pub mod engine;
pub mod error;
pub mod model;
pub mod queue;


pub use engine::{ProgressionEngine, TransitionRecord};
pub use error::{ProgressionError, ProgressionResult};
pub use model::{ConfiguredProgression, ProgressionModel};
pub use queue::TransitionQueue;
