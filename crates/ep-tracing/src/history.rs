//! `ContactHistory` — trailing window of who met whom, and for how long.
//!
//! One adjacency map per day, filled in both directions, so the contacts of
//! a person are found without scanning other persons.  Days older than the
//! window are dropped as the window advances.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use ep_core::{Day, PersonId};

type Adjacency = FxHashMap<PersonId, FxHashMap<PersonId, f64>>;

/// Serializable form: per day, `(a, b, seconds)` with `a < b`, sorted.
pub type HistoryExport = Vec<(Day, Vec<(PersonId, PersonId, f64)>)>;

#[derive(Clone, Debug, Default)]
pub struct ContactHistory {
    /// Window length in days, including the current day.  0 keeps nothing.
    period: u32,
    days:   BTreeMap<Day, Adjacency>,
}

impl ContactHistory {
    pub fn new(period: u32) -> Self {
        Self { period, days: BTreeMap::new() }
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    /// Add `seconds` of co-presence between `a` and `b` on `day`.
    pub fn record(&mut self, day: Day, a: PersonId, b: PersonId, seconds: f64) {
        if self.period == 0 || a == b || !(seconds > 0.0) {
            return;
        }
        let adj = self.days.entry(day).or_default();
        *adj.entry(a).or_default().entry(b).or_insert(0.0) += seconds;
        *adj.entry(b).or_default().entry(a).or_insert(0.0) += seconds;
    }

    /// Drop days that fall outside the window ending on `today`.
    pub fn prune(&mut self, today: Day) {
        let keep = self.days.split_off(&today.window_start(self.period));
        self.days = keep;
    }

    /// Distinct contacts of `person` within the window ending on `today`
    /// whose cumulative duration is at least `min_seconds`, ascending.
    pub fn contacts_of(&self, person: PersonId, today: Day, min_seconds: f64) -> Vec<PersonId> {
        if self.period == 0 {
            return Vec::new();
        }
        let mut total: BTreeMap<PersonId, f64> = BTreeMap::new();
        for (_, adj) in self.days.range(today.window_start(self.period)..=today) {
            if let Some(partners) = adj.get(&person) {
                for (&other, &secs) in partners {
                    *total.entry(other).or_insert(0.0) += secs;
                }
            }
        }
        total.into_iter().filter(|&(_, secs)| secs >= min_seconds).map(|(p, _)| p).collect()
    }

    /// Number of retained days.
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    pub fn export(&self) -> HistoryExport {
        self.days
            .iter()
            .map(|(&day, adj)| {
                let mut pairs: Vec<(PersonId, PersonId, f64)> = adj
                    .iter()
                    .flat_map(|(&a, partners)| {
                        partners.iter().filter(move |&(&b, _)| a < b).map(move |(&b, &s)| (a, b, s))
                    })
                    .collect();
                pairs.sort_unstable_by_key(|&(a, b, _)| (a, b));
                (day, pairs)
            })
            .collect()
    }

    pub fn import(period: u32, export: HistoryExport) -> Self {
        let mut history = Self::new(period);
        for (day, pairs) in export {
            for (a, b, seconds) in pairs {
                history.record(day, a, b, seconds);
            }
        }
        history
    }
}
