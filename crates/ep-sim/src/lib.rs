//! `ep-sim` — day loop orchestrator for the episim kernel.
//!
//! # Day loop
//!
//! ```text
//! for day in current..config.end_day():
//!   ① Events    — EventReplay → participation → PolicyEngine::admit.
//!   ② Release   — quarantines ending today are lifted.
//!   ③ Seeding   — initial infections on the seeding day.
//!   ④ Contact   — ContactModel::evaluate_day (parallel with `parallel`).
//!   ⑤ Infect    — ProgressionEngine::infect, ascending person.
//!   ⑥ Advance   — ProgressionEngine::advance(day).
//!   ⑦ Tracing   — record history, trace new symptomatic, flush queue.
//!   ⑧ Summary   — DaySummary to observers.
//! ```
//!
//! Days are strictly sequential; within a day every phase reads the state
//! committed by the previous one.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Evaluates contact partitions on Rayon's thread pool.      |
//!
//! # Checkpoint / resume
//!
//! [`Sim::snapshot`] captures the state at a day boundary;
//! [`SimBuilder::resume`] continues from it.  A resumed run produces the same
//! summaries as an uninterrupted one.

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;
pub mod snapshot;
pub mod summary;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{Both, NoopObserver, SimObserver, SummaryCollector};
pub use sim::{RunState, Sim};
pub use snapshot::{config_fingerprint, SimSnapshot};
pub use summary::DaySummary;
