//! `ep-output` — simulation output writers for the episim kernel.
//!
//! Two backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created           |
//! |-----------|---------|-------------------------|
//! | *(none)*  | CSV     | `daily_summaries.csv`   |
//! | `sqlite`  | SQLite  | `output.db`             |
//!
//! Both implement [`OutputWriter`] and are driven by [`SimOutputObserver`],
//! which implements `ep_sim::SimObserver`.
//!
//! [`ActivityAggregator`] is a separate observer producing the
//! `activity_change_{daily,weekly}.csv` report: admitted exposure time per
//! activity type as a percentage change against the first period.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ep_output::{ActivityAggregator, CsvWriter, ReportPeriod, SimOutputObserver};
//! use ep_sim::Both;
//!
//! let names = sim.registry().names().to_vec();
//! let mut out = SimOutputObserver::new(CsvWriter::new(dir, &names)?);
//! let mut report = ActivityAggregator::from_config(sim.config(), ReportPeriod::Weekly)?;
//! sim.run(&mut Both(&mut out, &mut report))?;
//! if let Some(e) = out.take_error() { eprintln!("output error: {e}"); }
//! report.write_csv(dir)?;
//! ```

pub mod activity;
pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use activity::{ActivityAggregator, ActivityChangeRow, ReportPeriod};
pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::DailySummaryRow;
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
