//! Plain data row types written by output backends.

use chrono::NaiveDate;

use ep_core::DiseaseState;
use ep_sim::DaySummary;

/// Fixed leading columns of `daily_summaries.csv`; one
/// `infections_<activity>` column per activity type follows.
pub const DAILY_COLUMNS: [&str; 21] = [
    "day",
    "date",
    "susceptible",
    "exposed",
    "contagious",
    "symptomatic",
    "seriously_sick",
    "critical",
    "seriously_sick_after_critical",
    "recovered",
    "new_infections",
    "quarantined",
    "released",
    "traced_quarantines",
    "household_quarantines",
    "symptomatic_isolations",
    "deferred_traces",
    "admitted_events",
    "restricted_events",
    "absent_events",
    "skipped_records",
];

/// One day of the run, flattened for tabular output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySummaryRow {
    pub day:                    u32,
    pub date:                   NaiveDate,
    pub state_counts:           [u64; DiseaseState::COUNT],
    pub new_infections:         u64,
    pub quarantined:            u64,
    pub released:               u64,
    pub traced_quarantines:     u64,
    pub household_quarantines:  u64,
    pub symptomatic_isolations: u64,
    pub deferred_traces:        u64,
    pub admitted_events:        u64,
    pub restricted_events:      u64,
    pub absent_events:          u64,
    pub skipped_records:        u64,
    /// In activity registry order.
    pub infections_by_activity: Vec<u64>,
}

impl From<&DaySummary> for DailySummaryRow {
    fn from(s: &DaySummary) -> Self {
        Self {
            day:                    s.day.0,
            date:                   s.date,
            state_counts:           s.state_counts,
            new_infections:         s.new_infections,
            quarantined:            s.quarantined,
            released:               s.released,
            traced_quarantines:     s.tracing.traced_quarantines,
            household_quarantines:  s.tracing.household_quarantines,
            symptomatic_isolations: s.tracing.symptomatic_isolations,
            deferred_traces:        s.tracing.deferred,
            admitted_events:        s.admitted_events,
            restricted_events:      s.restricted_events,
            absent_events:          s.absent_events,
            skipped_records:        s.skipped_records,
            infections_by_activity: s.infections_by_activity.clone(),
        }
    }
}

impl DailySummaryRow {
    /// Header for a run with the given activity types.
    pub fn header(activities: &[String]) -> Vec<String> {
        DAILY_COLUMNS
            .iter()
            .map(|c| (*c).to_owned())
            .chain(activities.iter().map(|a| format!("infections_{a}")))
            .collect()
    }

    /// Field values in [`header`][Self::header] order.
    pub fn fields(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(DAILY_COLUMNS.len() + self.infections_by_activity.len());
        out.push(self.day.to_string());
        out.push(self.date.to_string());
        out.extend(self.counts().iter().map(u64::to_string));
        out.extend(self.infections_by_activity.iter().map(u64::to_string));
        out
    }

    /// The count columns after `day` and `date`, in header order.
    pub fn counts(&self) -> Vec<u64> {
        let mut out = self.state_counts.to_vec();
        out.extend([
            self.new_infections,
            self.quarantined,
            self.released,
            self.traced_quarantines,
            self.household_quarantines,
            self.symptomatic_isolations,
            self.deferred_traces,
            self.admitted_events,
            self.restricted_events,
            self.absent_events,
            self.skipped_records,
        ]);
        out
    }
}
