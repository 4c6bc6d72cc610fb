//! CSV output backend.
//!
//! Creates `daily_summaries.csv` in the configured output directory.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{DailySummaryRow, OutputResult};

pub const DAILY_FILE: &str = "daily_summaries.csv";

/// Writes one row per simulated day.
pub struct CsvWriter {
    daily:      Writer<File>,
    activities: usize,
    finished:   bool,
}

impl CsvWriter {
    /// Create `daily_summaries.csv` in `dir` and write the header row.
    pub fn new(dir: &Path, activities: &[String]) -> OutputResult<Self> {
        let mut daily = Writer::from_path(dir.join(DAILY_FILE))?;
        daily.write_record(DailySummaryRow::header(activities))?;
        Ok(Self { daily, activities: activities.len(), finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_daily(&mut self, row: &DailySummaryRow) -> OutputResult<()> {
        debug_assert_eq!(row.infections_by_activity.len(), self.activities);
        self.daily.write_record(row.fields())?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.daily.flush()?;
        Ok(())
    }
}
