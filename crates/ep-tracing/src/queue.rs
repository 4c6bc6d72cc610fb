//! `QuarantineQueue` — traced contacts waiting for their quarantine order.
//!
//! Each day holds at most `capacity` orders.  A candidate whose target day is
//! full goes to the next day with room (FIFO overflow); nothing is dropped.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;

use ep_core::{Day, PersonId};

/// Where `enqueue` placed a candidate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub day:      Day,
    /// Placed on a later day than requested because of capacity.
    pub deferred: bool,
}

#[derive(Clone, Debug, Default)]
pub struct QuarantineQueue {
    /// `None` = unbounded.
    capacity: Option<u32>,
    inner:    BTreeMap<Day, Vec<PersonId>>,
    pending:  FxHashSet<PersonId>,
}

impl QuarantineQueue {
    pub fn new(capacity: Option<u32>) -> Self {
        Self { capacity, ..Self::default() }
    }

    pub fn capacity(&self) -> Option<u32> {
        self.capacity
    }

    pub fn is_pending(&self, person: PersonId) -> bool {
        self.pending.contains(&person)
    }

    /// Queue `person` for `target` or the first later day with room.
    ///
    /// Returns `None` if the person is already pending or the capacity is 0.
    pub fn enqueue(&mut self, target: Day, person: PersonId) -> Option<Placement> {
        if self.capacity == Some(0) || self.pending.contains(&person) {
            return None;
        }
        let mut day = target;
        if let Some(cap) = self.capacity {
            while self.inner.get(&day).is_some_and(|v| v.len() >= cap as usize) {
                day = day.next();
            }
        }
        self.inner.entry(day).or_default().push(person);
        self.pending.insert(person);
        Some(Placement { day, deferred: day != target })
    }

    /// Remove and return every entry due on or before `day`, in queue order.
    pub fn take_due(&mut self, day: Day) -> Vec<PersonId> {
        let later = match day.0.checked_add(1) {
            Some(next) => self.inner.split_off(&Day(next)),
            None => BTreeMap::new(),
        };
        let due: Vec<PersonId> = std::mem::replace(&mut self.inner, later).into_values().flatten().collect();
        for p in &due {
            self.pending.remove(p);
        }
        due
    }

    /// Entries currently scheduled for `day`.
    pub fn scheduled_on(&self, day: Day) -> &[PersonId] {
        self.inner.get(&day).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn export(&self) -> Vec<(Day, Vec<PersonId>)> {
        self.inner.iter().map(|(&d, v)| (d, v.clone())).collect()
    }

    pub fn import(capacity: Option<u32>, export: Vec<(Day, Vec<PersonId>)>) -> Self {
        let mut queue = Self::new(capacity);
        for (day, persons) in export {
            queue.pending.extend(persons.iter().copied());
            queue.inner.insert(day, persons);
        }
        queue
    }
}
