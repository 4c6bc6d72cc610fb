//! `ep-tracing` — contact tracing and quarantine.
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`history`] | `ContactHistory` (per-day adjacency, trailing window)     |
//! | [`queue`]   | `QuarantineQueue` (capacity-bounded, FIFO overflow)       |
//! | [`engine`]  | `TracingEngine`, `TracingStats`, `TracingState`           |

pub mod engine;
pub mod history;
pub mod queue;


pub use engine::{TracingEngine, TracingState, TracingStats};
pub use history::{ContactHistory, HistoryExport};
pub use queue::{Placement, QuarantineQueue};
