//! `TracingEngine` — contact tracing, household quarantine and
//! symptomatic isolation.
//!
//! # Day cycle
//!
//! | Call                       | Effect                                           |
//! |----------------------------|--------------------------------------------------|
//! | `release`                  | ends quarantines due today (start of day)        |
//! | `record_contacts`          | adds the day's admitted events to the history    |
//! | `on_traceable_transition`  | isolates the source, queues its traced contacts  |
//! | `flush`                    | issues the quarantine orders due today           |
//!
//! Household members are quarantined immediately, bypassing capacity and
//! ascertainment.  Nothing happens before `start_day`.

use serde::{Deserialize, Serialize};

use ep_core::rng::ordered_pair;
use ep_core::{Day, KeyedRng, PersonId, Stream, TracingConfig};
use ep_events::ContactEvent;
use ep_population::PersonStore;

use crate::{ContactHistory, HistoryExport, QuarantineQueue};

/// Per-day tracing counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracingStats {
    /// Contacts above the duration threshold found for today's sources.
    pub candidates:             u64,
    /// Contacts that passed ascertainment and were queued.
    pub enqueued:               u64,
    /// Queued contacts pushed past their target day by capacity.
    pub deferred:               u64,
    pub traced_quarantines:     u64,
    pub household_quarantines:  u64,
    pub symptomatic_isolations: u64,
}

/// Serializable tracing state for checkpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TracingState {
    pub history: HistoryExport,
    pub queue:   Vec<(Day, Vec<PersonId>)>,
}

pub struct TracingEngine {
    start_day:        Day,
    probability:      f64,
    min_duration:     f64,
    delay:            u32,
    household:        bool,
    isolate_sources:  bool,
    quarantine_days:  u32,
    history:          ContactHistory,
    queue:            QuarantineQueue,
    rng:              KeyedRng,
    stats:            TracingStats,
}

impl TracingEngine {
    pub fn new(config: &TracingConfig, rng: KeyedRng) -> Self {
        Self {
            start_day:       Day(config.start_day),
            probability:     config.tracing_probability,
            min_duration:    config.min_contact_duration_sec,
            delay:           config.tracing_delay_days,
            household:       config.quarantine_household_members,
            isolate_sources: config.quarantine_symptomatic,
            quarantine_days: config.quarantine_duration_days,
            history:         ContactHistory::new(config.tracing_period_days),
            queue:           QuarantineQueue::new(config.tracing_capacity_per_day),
            rng,
            stats:           TracingStats::default(),
        }
    }

    /// Engine with history and queue restored from a checkpoint.
    pub fn resume(config: &TracingConfig, rng: KeyedRng, state: TracingState) -> Self {
        let mut engine = Self::new(config, rng);
        engine.history = ContactHistory::import(config.tracing_period_days, state.history);
        engine.queue = QuarantineQueue::import(config.tracing_capacity_per_day, state.queue);
        engine
    }

    pub fn state(&self) -> TracingState {
        TracingState { history: self.history.export(), queue: self.queue.export() }
    }

    #[inline]
    pub fn is_active(&self, day: Day) -> bool {
        day >= self.start_day
    }

    pub fn history(&self) -> &ContactHistory {
        &self.history
    }

    pub fn queue(&self) -> &QuarantineQueue {
        &self.queue
    }

    /// Counters accumulated since the last call; resets them.
    pub fn take_stats(&mut self) -> TracingStats {
        std::mem::take(&mut self.stats)
    }

    // ── Day cycle ─────────────────────────────────────────────────────────

    /// End every quarantine whose last day was yesterday.
    pub fn release(&mut self, people: &mut PersonStore, day: Day) -> usize {
        people.release_expired(day)
    }

    /// Record the day's admitted events between two equipped persons.
    pub fn record_contacts(&mut self, people: &PersonStore, day: Day, events: &[ContactEvent]) {
        if self.history.period() == 0 {
            return;
        }
        for e in events {
            if people.equipped[e.person_a.index()] && people.equipped[e.person_b.index()] {
                self.history.record(day, e.person_a, e.person_b, e.duration);
            }
        }
        self.history.prune(day);
    }

    /// `source` entered a traceable state on `day`.
    pub fn on_traceable_transition(&mut self, people: &mut PersonStore, source: PersonId, day: Day) {
        if !self.is_active(day) {
            return;
        }
        if self.isolate_sources {
            if self.quarantine(people, source, day) {
                self.stats.symptomatic_isolations += 1;
            }
            self.quarantine_household(people, source, day);
        }

        if self.queue.capacity() == Some(0) || !people.equipped[source.index()] {
            return;
        }
        let target = day.offset(self.delay);
        let contacts = self.history.contacts_of(source, day, self.min_duration);
        self.stats.candidates += contacts.len() as u64;
        for contact in contacts {
            if people.is_quarantined(contact) || self.queue.is_pending(contact) {
                continue;
            }
            let key = ordered_pair(source.0, contact.0);
            if !self.rng.bernoulli(Stream::Tracing, day, key, 0, self.probability) {
                continue;
            }
            if let Some(placed) = self.queue.enqueue(target, contact) {
                self.stats.enqueued += 1;
                if placed.deferred {
                    self.stats.deferred += 1;
                    tracing::debug!(day = day.0, person = contact.0, to = placed.day.0, "trace deferred");
                }
            }
        }
    }

    /// Issue the quarantine orders due on `day`.
    pub fn flush(&mut self, people: &mut PersonStore, day: Day) {
        for person in self.queue.take_due(day) {
            if self.quarantine(people, person, day) {
                self.stats.traced_quarantines += 1;
            }
            self.quarantine_household(people, person, day);
        }
    }

    fn quarantine(&self, people: &mut PersonStore, person: PersonId, day: Day) -> bool {
        people.quarantine(person, day.offset(self.quarantine_days))
    }

    fn quarantine_household(&mut self, people: &mut PersonStore, person: PersonId, day: Day) {
        if !self.household {
            return;
        }
        let members: Vec<PersonId> = people.household_members(person).to_vec();
        for m in members.into_iter().filter(|&m| m != person) {
            if self.quarantine(people, m, day) {
                self.stats.household_quarantines += 1;
            }
        }
    }
}
