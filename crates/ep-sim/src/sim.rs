//! `Sim` — the day loop.

use std::fmt;

use chrono::NaiveDate;

use ep_contact::ContactModel;
use ep_core::{
    ActivityRegistry, ActivityType, Day, EpisimConfig, KeyedRng, MalformedRecordPolicy, PersonId,
    SimCalendar, Stream,
};
use ep_events::{ContactEvent, EventReplay, MalformedRecordError};
use ep_policy::PolicyEngine;
use ep_population::PersonStore;
use ep_progression::ProgressionEngine;
use ep_tracing::TracingEngine;

use crate::{DaySummary, SimError, SimObserver, SimResult, SimSnapshot};

/// Lifecycle of a run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Built or resumed; no day stepped yet.
    Initialized,
    /// The given day was the last one completed.
    Running(Day),
    /// Every configured day has been simulated.
    Completed,
}

/// Counts from the event phase.
#[derive(Default)]
struct EventTally {
    restricted: u64,
    absent:     u64,
    skipped:    u64,
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// # Day pipeline
///
/// 1. **Events**: pull the day's events from the replay; drop events of
///    absent persons (hospitalised, or quarantined outside home past today),
///    then let the policy admit or restrict each remaining event.
/// 2. **Release**: quarantines ending today are lifted.
/// 3. **Seeding**: on the seeding day, the initial infections are placed.
/// 4. **Contact**: evaluate the admitted events (optionally parallel).
/// 5. **Infect**: apply the infections, ascending by person.
/// 6. **Advance**: fire due disease transitions.
/// 7. **Tracing**: record contacts, trace new symptomatic persons, issue the
///    quarantine orders due today.
/// 8. **Summary**: aggregate counts for observers.
///
/// All mutation happens between phases, owned by the `Sim`; the state after
/// `step` returns is consistent and can be snapshotted.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    pub(crate) config:      EpisimConfig,
    pub(crate) fingerprint: String,
    pub(crate) registry:    ActivityRegistry,
    pub(crate) calendar:    SimCalendar,
    pub(crate) rng:         KeyedRng,
    pub(crate) home:        ActivityType,
    pub(crate) partitions:  usize,

    pub(crate) people:      PersonStore,
    pub(crate) replay:      Box<dyn EventReplay>,
    pub(crate) policy:      PolicyEngine,
    pub(crate) contact:     ContactModel,
    pub(crate) progression: ProgressionEngine,
    pub(crate) tracing:     TracingEngine,

    /// The next day to simulate.
    pub(crate) day:         Day,
    pub(crate) state:       RunState,
}

impl fmt::Debug for Sim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sim")
            .field("day", &self.day)
            .field("state", &self.state)
            .field("persons", &self.people.count)
            .field("partitions", &self.partitions)
            .field("seed", &self.rng.seed())
            .finish_non_exhaustive()
    }
}

impl Sim {
    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &EpisimConfig {
        &self.config
    }

    pub fn registry(&self) -> &ActivityRegistry {
        &self.registry
    }

    pub fn calendar(&self) -> &SimCalendar {
        &self.calendar
    }

    pub fn people(&self) -> &PersonStore {
        &self.people
    }

    pub fn tracing(&self) -> &TracingEngine {
        &self.tracing
    }

    pub fn progression(&self) -> &ProgressionEngine {
        &self.progression
    }

    /// The next day `step` will simulate.
    pub fn current_day(&self) -> Day {
        self.day
    }

    pub fn run_state(&self) -> RunState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.day >= self.config.end_day()
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current day to the configured horizon.
    ///
    /// Stops early, after a completed day, if the observer asks to.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        tracing::info!(from = self.day.0, to = self.config.end_day().0, persons = self.people.count, "run started");
        while !self.is_complete() {
            let summary = self.step(observer)?;
            if observer.should_stop(&summary) {
                tracing::info!(day = summary.day.0, "run stopped by observer");
                break;
            }
        }
        observer.on_sim_end(self.day);
        tracing::info!(next_day = self.day.0, "run finished");
        Ok(())
    }

    /// Simulate exactly one day from the current state.
    ///
    /// A replay or malformed-record error leaves the state untouched, so the
    /// day can be stepped again.  Later errors are broken invariants and may
    /// leave the day partly applied.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<DaySummary> {
        let day = self.day;
        let date = self.calendar.date(day);
        observer.on_day_start(day, date);

        // ── Phase 1: events, participation, policy (read-only) ────────────
        let (admitted, tally) = self.admitted_events(day, date)?;

        // ── Phase 2: release ──────────────────────────────────────────────
        let released = self.tracing.release(&mut self.people, day) as u64;
        observer.on_contacts(day, date, &admitted, &self.people);

        // ── Phase 3: seeding ──────────────────────────────────────────────
        let mut new_infections = self.seed_initial_infections(day)?;

        // ── Phase 4: contact evaluation (read-only, may be parallel) ──────
        let infections = self.contact.evaluate_day(&admitted, &self.people, day, self.partitions);

        // ── Phase 5: apply infections (ascending target) ──────────────────
        let mut by_activity = vec![0u64; self.registry.len()];
        for inf in &infections {
            if self.progression.infect(&mut self.people, inf.target, day)? {
                new_infections += 1;
                by_activity[inf.activity.index()] += 1;
            }
        }
        observer.on_infections(day, &infections);

        // ── Phase 6: progression ──────────────────────────────────────────
        let transitions = self.progression.advance(&mut self.people, day)?;

        // ── Phase 7: tracing ──────────────────────────────────────────────
        self.tracing.record_contacts(&self.people, day, &admitted);
        for t in transitions.iter().filter(|t| t.to.is_traceable()) {
            self.tracing.on_traceable_transition(&mut self.people, t.person, day);
        }
        self.tracing.flush(&mut self.people, day);

        // ── Phase 8: summary ──────────────────────────────────────────────
        let summary = DaySummary {
            day,
            date,
            state_counts:           self.people.state_counts(),
            new_infections,
            infections_by_activity: by_activity,
            quarantined:            self.people.quarantined_count(),
            released,
            tracing:                self.tracing.take_stats(),
            admitted_events:        admitted.len() as u64,
            restricted_events:      tally.restricted,
            absent_events:          tally.absent,
            skipped_records:        tally.skipped,
        };
        tracing::debug!(
            day = day.0,
            %date,
            new_infections,
            infectious = summary.infectious(),
            quarantined = summary.quarantined,
            deferred = summary.tracing.deferred,
            "day complete"
        );

        self.day = day.next();
        self.state = if self.is_complete() { RunState::Completed } else { RunState::Running(day) };
        observer.on_day_end(&summary, &self.people);
        Ok(summary)
    }

    /// Checkpoint at the current day boundary.
    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot {
            next_day:           self.day,
            seed:               self.rng.seed(),
            config_fingerprint: self.fingerprint.clone(),
            people:             self.people.clone(),
            tracing:            self.tracing.state(),
        }
    }

    // ── Phases ────────────────────────────────────────────────────────────

    fn admitted_events(&self, day: Day, date: NaiveDate) -> SimResult<(Vec<ContactEvent>, EventTally)> {
        let mut admitted = Vec::new();
        let mut tally = EventTally::default();

        for (ordinal, item) in self.replay.events_for_day(day, date)?.enumerate() {
            let event = match item.and_then(|e| self.check_persons(e)) {
                Ok(e) => e,
                Err(error) => {
                    self.on_malformed(day, error)?;
                    tally.skipped += 1;
                    continue;
                }
            };
            let present = self.people.participates_on(event.person_a, event.activity, self.home, day)
                && self.people.participates_on(event.person_b, event.activity, self.home, day);
            if !present {
                tally.absent += 1;
            } else if self.policy.admit(&event, ordinal as u64, day) {
                admitted.push(event);
            } else {
                tally.restricted += 1;
            }
        }
        Ok((admitted, tally))
    }

    fn check_persons(&self, event: ContactEvent) -> Result<ContactEvent, MalformedRecordError> {
        for p in [event.person_a, event.person_b] {
            if !self.people.contains(p) {
                return Err(MalformedRecordError::new(
                    0,
                    format!("{p} outside population of {}", self.people.count),
                ));
            }
        }
        Ok(event)
    }

    fn on_malformed(&self, day: Day, error: MalformedRecordError) -> SimResult<()> {
        match self.config.on_malformed_record {
            MalformedRecordPolicy::Abort => Err(SimError::Malformed { day: day.0, source: error }),
            MalformedRecordPolicy::Skip => {
                tracing::warn!(day = day.0, line = error.line, reason = %error.reason, "skipping malformed record");
                Ok(())
            }
        }
    }

    /// On the seeding day, expose the first `initial_infections` susceptible
    /// persons in keyed-hash order.
    fn seed_initial_infections(&mut self, day: Day) -> SimResult<u64> {
        if day.0 != self.config.initial_infection_day || self.config.initial_infections == 0 {
            return Ok(0);
        }
        let mut order: Vec<(u64, PersonId)> = self
            .people
            .person_ids()
            .filter(|p| self.people.state[p.index()].is_susceptible())
            .map(|p| (self.rng.key(Stream::Seeding, Day::ZERO, u64::from(p.0), 0), p))
            .collect();
        order.sort_unstable();

        let mut seeded = 0;
        for &(_, person) in order.iter().take(self.config.initial_infections as usize) {
            if self.progression.infect(&mut self.people, person, day)? {
                seeded += 1;
            }
        }
        tracing::info!(day = day.0, seeded, "initial infections placed");
        Ok(seeded)
    }
}
