//! The `EventReplay` trait and the CSV-backed replay.
//!
//! # CSV format
//!
//! ```csv
//! date,person_a,person_b,container,activity,start_time,duration
//! 2020-03-01,0,1,17,home,0,28800
//! 2020-03-01,2,5,903,work,30600,1800
//! ```
//!
//! Columns are located by header name, so their order is free and unknown
//! columns are ignored.  `container` may be omitted, in which case every event
//! gets `ContainerId::INVALID`.  `start_time` and `duration` are seconds;
//! `activity` must be a configured activity tag.  Every record must have as
//! many fields as the header.
//!
//! # Replay modes
//!
//! | Mode     | `events_for_day(day)` yields                               |
//! |----------|------------------------------------------------------------|
//! | `Dated`  | records whose `date` equals the calendar date of `day`     |
//! | `Cyclic` | records whose `date` falls on the same weekday (typical week) |
//!
//! The file is re-opened and streamed for every day, so memory stays bounded
//! by one record regardless of file size.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, Weekday};
use csv::StringRecord;

use ep_core::{ActivityRegistry, ContainerId, Day, PersonId};

use crate::{ContactEvent, EventError, EventResult, MalformedRecordError};

/// A day's worth of events.  Each item is either a parsed event or the
/// record that failed to parse.
pub type DayEvents<'a> = Box<dyn Iterator<Item = Result<ContactEvent, MalformedRecordError>> + 'a>;

/// A re-playable, day-scoped source of contact events.
///
/// Implementations must yield the same sequence every time they are asked
/// for the same day; the runner relies on this for checkpoint/resume.
pub trait EventReplay: Send + Sync {
    /// Events for simulation day `day`, whose calendar date is `date`.
    ///
    /// Fails only if the source as a whole cannot be read; individual bad
    /// records are yielded as `Err` items.
    fn events_for_day(&self, day: Day, date: NaiveDate) -> EventResult<DayEvents<'_>>;
}

/// How stream dates map to simulation days.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ReplayMode {
    #[default]
    Dated,
    /// The stream describes one typical week, replayed for every week.
    Cyclic,
}

// ── CSV replay ────────────────────────────────────────────────────────────────

const REQUIRED: [&str; 6] = ["date", "person_a", "person_b", "activity", "start_time", "duration"];

/// Header layout: positions of the required columns in `REQUIRED` order, the
/// optional `container` column, and the header width.  Other columns are
/// ignored.
#[derive(Copy, Clone, Debug)]
struct Columns {
    required:  [usize; 6],
    /// Without this column every event gets `ContainerId::INVALID`.
    container: Option<usize>,
    width:     usize,
}

impl Columns {
    fn from_header(header: &StringRecord) -> EventResult<Self> {
        let position = |name: &str| header.iter().position(|h| h == name);
        let mut required = [0usize; 6];
        for (slot, name) in required.iter_mut().zip(REQUIRED) {
            *slot = position(name).ok_or_else(|| EventError::Header(format!("missing column {name:?}")))?;
        }
        Ok(Self { required, container: position("container"), width: header.len() })
    }
}

#[derive(Clone, Debug)]
pub struct CsvEventReplay {
    path:     PathBuf,
    registry: ActivityRegistry,
    mode:     ReplayMode,
    columns:  Columns,
}

impl CsvEventReplay {
    /// Open `path` once to validate its header.
    pub fn new(path: impl AsRef<Path>, registry: ActivityRegistry, mode: ReplayMode) -> EventResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut reader = Self::reader(&path)?;
        let columns = Columns::from_header(reader.headers()?)?;
        Ok(Self { path, registry, mode, columns })
    }

    pub fn mode(&self) -> ReplayMode {
        self.mode
    }

    fn reader(path: &Path) -> EventResult<csv::Reader<File>> {
        let file = File::open(path)?;
        Ok(csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file))
    }
}

impl EventReplay for CsvEventReplay {
    fn events_for_day(&self, _day: Day, date: NaiveDate) -> EventResult<DayEvents<'_>> {
        let filter = match self.mode {
            ReplayMode::Dated  => DayFilter::Date(date),
            ReplayMode::Cyclic => DayFilter::Weekday(date.weekday()),
        };
        Ok(Box::new(CsvDayIter {
            records:  Self::reader(&self.path)?.into_records(),
            columns:  self.columns,
            registry: &self.registry,
            filter,
        }))
    }
}

#[derive(Copy, Clone, Debug)]
enum DayFilter {
    Date(NaiveDate),
    Weekday(Weekday),
}

impl DayFilter {
    fn matches(self, date: NaiveDate) -> bool {
        match self {
            DayFilter::Date(d)    => date == d,
            DayFilter::Weekday(w) => date.weekday() == w,
        }
    }
}

struct CsvDayIter<'a> {
    records:  csv::StringRecordsIntoIter<File>,
    columns:  Columns,
    registry: &'a ActivityRegistry,
    filter:   DayFilter,
}

impl Iterator for CsvDayIter<'_> {
    type Item = Result<ContactEvent, MalformedRecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(r) => r,
                Err(e) => {
                    let line = e.position().map_or(0, |p| p.line());
                    return Some(Err(MalformedRecordError::new(line, e.to_string())));
                }
            };
            let line = record.position().map_or(0, |p| p.line());

            // Only the date is parsed for records of other days.
            let date = match parse_field::<NaiveDate>(&record, self.columns.required[0], "date", line) {
                Ok(d) => d,
                Err(e) => return Some(Err(e)),
            };
            if !self.filter.matches(date) {
                continue;
            }
            return Some(parse_event(&record, self.columns, self.registry, line));
        }
    }
}

fn parse_event(
    record:   &StringRecord,
    columns:  Columns,
    registry: &ActivityRegistry,
    line:     u64,
) -> Result<ContactEvent, MalformedRecordError> {
    if record.len() != columns.width {
        return Err(MalformedRecordError::new(
            line,
            format!("expected {} fields, found {}", columns.width, record.len()),
        ));
    }
    let [_, a, b, activity, start, duration] = columns.required;
    let container = match columns.container {
        Some(idx) => ContainerId(parse_field(record, idx, "container", line)?),
        None => ContainerId::INVALID,
    };

    let tag = record.get(activity).unwrap_or_default();
    let activity = registry
        .resolve(tag)
        .ok_or_else(|| MalformedRecordError::new(line, format!("unknown activity type {tag:?}")))?;
    let duration: f64 = parse_field(record, duration, "duration", line)?;
    if !(duration.is_finite() && duration >= 0.0) {
        return Err(MalformedRecordError::new(line, format!("invalid duration {duration}")));
    }

    Ok(ContactEvent {
        person_a:   PersonId(parse_field(record, a, "person_a", line)?),
        person_b:   PersonId(parse_field(record, b, "person_b", line)?),
        container,
        activity,
        start_time: parse_field(record, start, "start_time", line)?,
        duration,
    })
}

fn parse_field<T>(record: &StringRecord, idx: usize, name: &str, line: u64) -> Result<T, MalformedRecordError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = record
        .get(idx)
        .ok_or_else(|| MalformedRecordError::new(line, format!("missing field {name}")))?;
    raw.parse()
        .map_err(|e| MalformedRecordError::new(line, format!("{name} {raw:?}: {e}")))
}
