//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use ep_core::Day;
use ep_population::PersonStore;
use ep_sim::{DaySummary, SimObserver};

use crate::row::DailySummaryRow;
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes one [`DailySummaryRow`] per day to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                tracing::warn!(error = %e, "output write failed");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_day_end(&mut self, summary: &DaySummary, _people: &PersonStore) {
        let result = self.writer.write_daily(&DailySummaryRow::from(summary));
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _next_day: Day) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
