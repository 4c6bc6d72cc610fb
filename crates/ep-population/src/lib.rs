//! `ep-population` — person storage for the episim kernel.
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`store`]   | `PersonStore` (SoA), quarantine and participation     |
//! | [`builder`] | `PopulationBuilder`, keyed multiplier sampling        |
//! | [`loader`]  | population CSV loading                                |
//! | [`error`]   | `PopulationError`, `PopulationResult`                 |

pub mod builder;
pub mod error;
pub mod loader;
pub mod store;

#[cfg(test)]
mod tests;

pub use builder::PopulationBuilder;
pub use error::{PopulationError, PopulationResult};
pub use loader::{load_population_csv, load_population_reader};
pub use store::{PersonStore, QuarantineStatus, ScheduledTransition};
