//! In-memory replay for tests, demos and single-step benchmarks.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use ep_core::Day;

use crate::{ContactEvent, DayEvents, EventReplay, EventResult, MalformedRecordError, ReplayMode};

type Record = Result<ContactEvent, MalformedRecordError>;

/// Serves pre-built events keyed by date, by weekday, or the same list for
/// every day.
#[derive(Clone, Debug, Default)]
pub struct MemoryReplay {
    mode:      ReplayMode,
    by_date:   BTreeMap<NaiveDate, Vec<Record>>,
    /// Served on every day in addition to the dated records.
    every_day: Vec<Record>,
}

impl MemoryReplay {
    pub fn new(mode: ReplayMode) -> Self {
        Self { mode, ..Self::default() }
    }

    /// The same events on every simulated day.
    pub fn repeating(events: Vec<ContactEvent>) -> Self {
        Self {
            every_day: events.into_iter().map(Ok).collect(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, date: NaiveDate, event: ContactEvent) {
        self.by_date.entry(date).or_default().push(Ok(event));
    }

    /// Record a bad input line for `date`; it is yielded as an `Err` item.
    pub fn push_malformed(&mut self, date: NaiveDate, error: MalformedRecordError) {
        self.by_date.entry(date).or_default().push(Err(error));
    }

    pub fn with_events(mut self, date: NaiveDate, events: impl IntoIterator<Item = ContactEvent>) -> Self {
        for e in events {
            self.push(date, e);
        }
        self
    }
}

impl EventReplay for MemoryReplay {
    fn events_for_day(&self, _day: Day, date: NaiveDate) -> EventResult<DayEvents<'_>> {
        let mode = self.mode;
        let dated = self
            .by_date
            .iter()
            .filter(move |(d, _)| match mode {
                ReplayMode::Dated  => **d == date,
                ReplayMode::Cyclic => d.weekday() == date.weekday(),
            })
            .flat_map(|(_, records)| records.iter().cloned());
        Ok(Box::new(self.every_day.iter().cloned().chain(dated)))
    }
}
