//! Activity change report.
//!
//! Sums the exposure time of admitted events per activity type over daily or
//! weekly periods and reports every period as a percentage change against
//! the first one.
//!
//! | Column      | Value                                                  |
//! |-------------|--------------------------------------------------------|
//! | `date`      | last date of the period                                |
//! | `<activity>`| `round_half_up((value / base − 1) × 100)`, `NA` if base is 0 |
//! | `notAtHome` | same, over the sum of every non-home activity type     |
//!
//! An incomplete trailing week is not reported.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::WriterBuilder;

use ep_core::{ActivityType, Day, EpisimConfig};
use ep_events::ContactEvent;
use ep_population::PersonStore;
use ep_sim::{DaySummary, SimObserver};

use crate::OutputResult;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ReportPeriod {
    #[default]
    Daily,
    Weekly,
}

impl ReportPeriod {
    pub fn days(self) -> u32 {
        match self {
            ReportPeriod::Daily => 1,
            ReportPeriod::Weekly => 7,
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            ReportPeriod::Daily => "activity_change_daily.csv",
            ReportPeriod::Weekly => "activity_change_weekly.csv",
        }
    }
}

/// One reported period.
#[derive(Clone, Debug, PartialEq)]
pub struct ActivityChangeRow {
    pub date:    NaiveDate,
    /// Exposure seconds per activity type, then `notAtHome`.
    pub totals:  Vec<f64>,
    /// Same layout as `totals`.  `None` where the baseline is zero.
    pub changes: Vec<Option<i64>>,
}

/// Percentage change of `value` against `base`, rounded half up.
pub fn percent_change(value: f64, base: f64) -> Option<i64> {
    if base == 0.0 {
        return None;
    }
    Some(((value / base - 1.0) * 100.0 + 0.5).floor() as i64)
}

/// [`SimObserver`] collecting the activity change report.
#[derive(Clone, Debug)]
pub struct ActivityAggregator {
    activities:     Vec<String>,
    home:           ActivityType,
    period:         ReportPeriod,
    regions:        Option<BTreeSet<u32>>,
    /// Seconds per activity type in the open period.
    current:        Vec<f64>,
    days_in_period: u32,
    /// Totals of the first period, `notAtHome` last.
    baseline:       Option<Vec<f64>>,
    rows:           Vec<ActivityChangeRow>,
}

impl ActivityAggregator {
    pub fn new(activities: &[String], home: ActivityType, period: ReportPeriod) -> Self {
        Self {
            activities: activities.to_vec(),
            home,
            period,
            regions: None,
            current: vec![0.0; activities.len()],
            days_in_period: 0,
            baseline: None,
            rows: Vec::new(),
        }
    }

    pub fn from_config(config: &EpisimConfig, period: ReportPeriod) -> OutputResult<Self> {
        let registry = config.activity_registry()?;
        let home = registry.require(&config.home_activity, "home_activity")?;
        Ok(Self::new(registry.names(), home, period))
    }

    /// Only count events whose first participant lives in one of `regions`.
    pub fn with_regions(mut self, regions: impl IntoIterator<Item = u32>) -> Self {
        self.regions = Some(regions.into_iter().collect());
        self
    }

    pub fn period(&self) -> ReportPeriod {
        self.period
    }

    pub fn rows(&self) -> &[ActivityChangeRow] {
        &self.rows
    }

    pub fn header(&self) -> Vec<String> {
        let mut h = Vec::with_capacity(self.activities.len() + 2);
        h.push("date".to_owned());
        h.extend(self.activities.iter().cloned());
        h.push("notAtHome".to_owned());
        h
    }

    /// Add the exposure time of `events` to the open period.
    pub fn add_events(&mut self, events: &[ContactEvent], people: &PersonStore) {
        for e in events {
            if let Some(regions) = &self.regions {
                match people.region.get(e.person_a.index()).copied().flatten() {
                    Some(r) if regions.contains(&r) => {}
                    _ => continue,
                }
            }
            if let Some(slot) = self.current.get_mut(e.activity.index()) {
                *slot += e.duration;
            }
        }
    }

    /// Close `date`; emits a row when it completes a period.
    pub fn close_day(&mut self, date: NaiveDate) {
        self.days_in_period += 1;
        if self.days_in_period < self.period.days() {
            return;
        }

        let mut totals = std::mem::replace(&mut self.current, vec![0.0; self.activities.len()]);
        let not_at_home: f64 = totals
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != self.home.index())
            .map(|(_, v)| v)
            .sum();
        totals.push(not_at_home);
        self.days_in_period = 0;

        let base = self.baseline.get_or_insert_with(|| totals.clone());
        let changes = totals.iter().zip(base.iter()).map(|(&v, &b)| percent_change(v, b)).collect();
        self.rows.push(ActivityChangeRow { date, totals, changes });
    }

    /// Write the report into `dir`; returns the file path.
    pub fn write_csv(&self, dir: &Path) -> OutputResult<PathBuf> {
        let path = dir.join(self.period.file_name());
        let mut w = WriterBuilder::new().delimiter(b';').from_path(&path)?;
        w.write_record(self.header())?;
        for row in &self.rows {
            let mut record = Vec::with_capacity(row.changes.len() + 1);
            record.push(row.date.to_string());
            record.extend(row.changes.iter().map(|c| c.map_or_else(|| "NA".to_owned(), |v| v.to_string())));
            w.write_record(&record)?;
        }
        w.flush()?;
        Ok(path)
    }
}

impl SimObserver for ActivityAggregator {
    fn on_contacts(&mut self, _day: Day, _date: NaiveDate, admitted: &[ContactEvent], people: &PersonStore) {
        self.add_events(admitted, people);
    }

    fn on_day_end(&mut self, summary: &DaySummary, _people: &PersonStore) {
        self.close_day(summary.date);
    }
}
