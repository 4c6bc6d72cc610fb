//! Simulation time model.
//!
//! Time advances in whole simulated days.  `Day(0)` is the configured start
//! date; the mapping to calendar dates is held in [`SimCalendar`]:
//!
//!   date = start_date + day
//!
//! Using an integer day as the canonical time unit keeps every scheduled
//! transition, quarantine and tracing delay exact.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

// ── Day ───────────────────────────────────────────────────────────────────────

/// An absolute simulated-day counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Day(pub u32);

impl Day {
    pub const ZERO: Day = Day(0);

    /// Return the day `n` days after `self`.
    #[inline]
    pub fn offset(self, n: u32) -> Day {
        Day(self.0.saturating_add(n))
    }

    /// Days elapsed from `earlier` to `self`, or 0 if `earlier` is later.
    #[inline]
    pub fn since(self, earlier: Day) -> u32 {
        self.0.saturating_sub(earlier.0)
    }

    /// The first day of a trailing window of `len` days ending at `self`
    /// (inclusive), clamped at day 0.
    #[inline]
    pub fn window_start(self, len: u32) -> Day {
        Day(self.0.saturating_add(1).saturating_sub(len))
    }

    #[inline]
    pub fn next(self) -> Day {
        self.offset(1)
    }
}

impl std::ops::Add<u32> for Day {
    type Output = Day;
    #[inline]
    fn add(self, rhs: u32) -> Day {
        self.offset(rhs)
    }
}

impl std::ops::Sub for Day {
    type Output = u32;
    #[inline]
    fn sub(self, rhs: Day) -> u32 {
        self.since(rhs)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

// ── SimCalendar ───────────────────────────────────────────────────────────────

/// Converts between simulated days and calendar dates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimCalendar {
    pub start_date: NaiveDate,
}

impl SimCalendar {
    pub fn new(start_date: NaiveDate) -> Self {
        Self { start_date }
    }

    /// Calendar date of `day`.  Saturates at `NaiveDate::MAX`.
    pub fn date(&self, day: Day) -> NaiveDate {
        self.start_date
            .checked_add_days(Days::new(u64::from(day.0)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Simulated day of `date`, or `None` if it precedes the start date or is
    /// beyond the `u32` horizon.
    pub fn day_of(&self, date: NaiveDate) -> Option<Day> {
        let delta = date.signed_duration_since(self.start_date).num_days();
        u32::try_from(delta).ok().map(Day)
    }

    /// Weekday of `day`.
    pub fn weekday(&self, day: Day) -> Weekday {
        self.date(day).weekday()
    }
}

impl fmt::Display for SimCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "calendar starting {}", self.start_date)
    }
}
