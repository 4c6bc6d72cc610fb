//! The `OutputWriter` trait implemented by all backend writers.

use crate::{DailySummaryRow, OutputResult};

/// Trait implemented by the CSV and SQLite writers.
///
/// Errors are surfaced to the observer, which stores the first one for
/// [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write one day's summary row.
    fn write_daily(&mut self, row: &DailySummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying handles.  Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
