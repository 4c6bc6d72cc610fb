//! `TransitionQueue` — sparse per-day queue of pending disease transitions.
//!
//! Most persons are susceptible or recovered on most days.  Instead of
//! scanning all N persons daily, every scheduled transition registers the day
//! it falls due; `advance` drains only those persons.
//!
//! Entries are hints: the authoritative pending transition lives in
//! `PersonStore::next_transition`, so a stale entry is skipped by the engine.

use std::collections::BTreeMap;

use ep_core::{Day, PersonId};
use ep_population::PersonStore;

#[derive(Clone, Debug, Default)]
pub struct TransitionQueue {
    inner: BTreeMap<Day, Vec<PersonId>>,
    /// Cached entry count for O(1) `len()`.
    total: usize,
}

impl TransitionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from the pending transitions stored per person.
    pub fn from_store(people: &PersonStore) -> Self {
        let mut queue = Self::new();
        for person in people.person_ids() {
            if let Some(t) = people.next_transition[person.index()] {
                queue.push(t.day, person);
            }
        }
        queue
    }

    pub fn push(&mut self, day: Day, person: PersonId) {
        self.inner.entry(day).or_default().push(person);
        self.total += 1;
    }

    /// Remove and return every person due on or before `day`, ascending and
    /// without duplicates.  Days skipped by the caller are included.
    pub fn drain_through(&mut self, day: Day) -> Vec<PersonId> {
        let later = match day.0.checked_add(1) {
            Some(next) => self.inner.split_off(&Day(next)),
            None => BTreeMap::new(),
        };
        let due = std::mem::replace(&mut self.inner, later);
        let mut persons: Vec<PersonId> = due.into_values().flatten().collect();
        self.total -= persons.len();
        persons.sort_unstable();
        persons.dedup();
        persons
    }

    /// The earliest day with at least one entry.
    pub fn next_day(&self) -> Option<Day> {
        self.inner.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of distinct future days with at least one entry.
    pub fn day_count(&self) -> usize {
        self.inner.len()
    }
}
