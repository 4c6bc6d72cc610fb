//! Unit tests for ep-sim.

use chrono::NaiveDate;

use ep_core::{
    ActivityType, ContainerId, EpisimConfig, HouseholdId, InfectionConfig, PersonId, TracingConfig,
};
use ep_events::{ContactEvent, EventReplay, MemoryReplay};
use ep_population::PopulationBuilder;

use crate::{DaySummary, Sim, SimBuilder, SimObserver, SummaryCollector};

const N: u32 = 300;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()
}

fn config() -> EpisimConfig {
    EpisimConfig {
        start_date:            start(),
        days:                  40,
        seed:                  4711,
        num_threads:           Some(1),
        activity_types:        vec!["home".into(), "work".into(), "leisure".into()],
        home_activity:         "home".into(),
        on_malformed_record:   Default::default(),
        initial_infections:    5,
        initial_infection_day: 0,
        infection:             InfectionConfig { calibration_parameter: 2e-5, activity_corrections: vec![] },
        population:            Default::default(),
        progression:           Default::default(),
        tracing:               TracingConfig {
            tracing_period_days:          3,
            tracing_capacity_per_day:     Some(5),
            tracing_delay_days:           1,
            quarantine_household_members: true,
            ..TracingConfig::default()
        },
        policy:                vec![],
    }
}

fn population() -> PopulationBuilder {
    let mut b = PopulationBuilder::new(N as usize);
    for p in 0..N as usize {
        b = b.household_of(p, HouseholdId((p / 3) as u32)).age_of(p, (p % 90) as u8);
    }
    b
}

fn contact(a: u32, b: u32, container: u64, activity: u16, duration: f64) -> ContactEvent {
    ContactEvent {
        person_a:   PersonId(a),
        person_b:   PersonId(b),
        container:  ContainerId(container),
        activity:   ActivityType(activity),
        start_time: 0,
        duration,
    }
}

/// Households of three at home, one work partner each, leisure for half.
fn events() -> Vec<ContactEvent> {
    let mut v = Vec::new();
    for h in 0..N / 3 {
        let b = h * 3;
        for (x, y) in [(b, b + 1), (b, b + 2), (b + 1, b + 2)] {
            v.push(contact(x, y, u64::from(h), 0, 28_800.0));
        }
    }
    for i in 0..N {
        let j = (i * 37 + 11) % N;
        if i != j {
            v.push(contact(i, j, 1_000 + u64::from(i / 10), 1, 14_400.0));
        }
    }
    for i in (0..N).step_by(2) {
        let j = (i * 91 + 5) % N;
        if i != j {
            v.push(contact(i, j, 2_000 + u64::from(i / 20), 2, 3_600.0));
        }
    }
    v
}

fn replay() -> Box<dyn EventReplay> {
    Box::new(MemoryReplay::repeating(events()))
}

fn build(config: EpisimConfig) -> Sim {
    SimBuilder::new(config, replay()).population(population()).build().unwrap()
}

fn run_all(config: EpisimConfig) -> Vec<DaySummary> {
    let mut sim = build(config);
    let mut obs = SummaryCollector::default();
    sim.run(&mut obs).unwrap();
    obs.summaries
}

/// Records every admitted event.
#[derive(Default)]
struct AdmittedLog(Vec<ContactEvent>);

impl SimObserver for AdmittedLog {
    fn on_contacts(&mut self, _day: ep_core::Day, _date: NaiveDate, admitted: &[ContactEvent], _people: &ep_population::PersonStore) {
        self.0.extend_from_slice(admitted);
    }
}

// ── Determinism ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod determinism {
    use super::{config, run_all};

    #[test]
    fn epidemic_spreads() {
        let s = run_all(config());
        assert_eq!(s.len(), 40);
        assert!(s.last().unwrap().cumulative_infected() > 20);
    }

    #[test]
    fn identical_runs_identical_output() {
        let a = serde_json::to_string(&run_all(config())).unwrap();
        let b = serde_json::to_string(&run_all(config())).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn independent_of_partition_count() {
        let reference = serde_json::to_string(&run_all(config())).unwrap();
        for threads in [2, 3, 8, 64] {
            let mut cfg = config();
            cfg.num_threads = Some(threads);
            let out = serde_json::to_string(&run_all(cfg)).unwrap();
            assert_eq!(out, reference, "num_threads = {threads}");
        }
    }

    #[test]
    fn seed_changes_output() {
        let mut cfg = config();
        cfg.seed = 1;
        assert_ne!(run_all(cfg), run_all(config()));
    }
}

// ── Day pipeline ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod pipeline {
    use ep_core::{Day, DiseaseState, DayRef, PersonId, PolicyEntry};

    use super::{build, config, run_all, AdmittedLog, N};
    use crate::{NoopObserver, RunState, SimObserver, DaySummary};

    #[test]
    fn seeds_on_seeding_day() {
        let mut cfg = config();
        cfg.initial_infection_day = 2;
        let s = run_all(cfg);
        assert_eq!(s[0].new_infections, 0);
        assert_eq!(s[1].new_infections, 0);
        assert!(s[2].new_infections >= 5);
        assert_eq!(s[2].count(DiseaseState::Exposed), s[2].new_infections);
    }

    #[test]
    fn state_counts_cover_population() {
        for s in run_all(config()) {
            assert_eq!(s.state_counts.iter().sum::<u64>(), u64::from(N));
            assert_eq!(s.infections_by_activity.len(), 3);
        }
    }

    #[test]
    fn contact_infections_attributed_to_activities() {
        let s = run_all(config());
        let attributed: u64 = s.iter().flat_map(|d| d.infections_by_activity.iter()).sum();
        let total: u64 = s.iter().map(|d| d.new_infections).sum();
        assert_eq!(attributed + 5, total);
    }

    #[test]
    fn zero_fraction_admits_no_events_of_that_type() {
        let mut cfg = config();
        cfg.policy.push(PolicyEntry { from: DayRef::Day(0), activity: "work".into(), remaining_fraction: 0.0 });
        let mut sim = build(cfg);
        let mut log = AdmittedLog::default();
        let mut restricted = 0;
        for _ in 0..5 {
            restricted += sim.step(&mut log).unwrap().restricted_events;
        }
        assert!(log.0.iter().all(|e| e.activity.0 != 1));
        assert!(log.0.iter().any(|e| e.activity.0 == 2));
        assert!(restricted > 0);
    }

    #[test]
    fn full_fraction_admits_everything_present() {
        let mut cfg = config();
        cfg.initial_infections = 0;
        cfg.policy.push(PolicyEntry { from: DayRef::Day(0), activity: "work".into(), remaining_fraction: 1.0 });
        let mut sim = build(cfg);
        let s = sim.step(&mut NoopObserver).unwrap();
        assert_eq!(s.restricted_events, 0);
        assert_eq!(s.absent_events, 0);
        assert_eq!(s.admitted_events as usize, super::events().len());
    }

    #[test]
    fn quarantined_person_only_at_home() {
        let mut sim = build(config());
        sim.people.quarantine(PersonId(0), Day(100));
        let mut log = AdmittedLog::default();
        let s = sim.step(&mut log).unwrap();
        assert!(s.absent_events > 0);
        assert!(
            log.0
                .iter()
                .filter(|e| e.person_a == PersonId(0) || e.person_b == PersonId(0))
                .all(|e| e.activity.0 == 0)
        );
        assert!(log.0.iter().any(|e| e.person_a == PersonId(0)));
    }

    #[test]
    fn hospitalised_person_takes_part_in_nothing() {
        let mut sim = build(config());
        sim.people.state[0] = DiseaseState::Critical;
        let mut log = AdmittedLog::default();
        sim.step(&mut log).unwrap();
        assert!(log.0.iter().all(|e| e.person_a != PersonId(0) && e.person_b != PersonId(0)));
    }

    #[test]
    fn run_completes() {
        let mut sim = build(config());
        assert_eq!(sim.run_state(), RunState::Initialized);
        sim.run(&mut NoopObserver).unwrap();
        assert!(sim.is_complete());
        assert_eq!(sim.run_state(), RunState::Completed);
        assert_eq!(sim.current_day(), Day(40));
    }

    struct StopAfter(u32, bool);

    impl SimObserver for StopAfter {
        fn should_stop(&mut self, summary: &DaySummary) -> bool {
            summary.day.0 >= self.0
        }

        fn on_sim_end(&mut self, _next_day: Day) {
            self.1 = true;
        }
    }

    #[test]
    fn observer_stops_after_completed_day() {
        let mut sim = build(config());
        let mut obs = StopAfter(3, false);
        sim.run(&mut obs).unwrap();
        assert_eq!(sim.current_day(), Day(4));
        assert_eq!(sim.run_state(), RunState::Running(Day(3)));
        assert!(obs.1);
    }

    #[test]
    fn tracing_quarantines_someone() {
        let s = run_all(config());
        assert!(s.iter().any(|d| d.quarantined > 0));
        assert!(s.iter().any(|d| d.tracing.symptomatic_isolations > 0));
        assert!(s.iter().all(|d| d.tracing.traced_quarantines <= 5));
    }
}

// ── Malformed records ─────────────────────────────────────────────────────────

#[cfg(test)]
mod malformed {
    use ep_core::{Day, MalformedRecordPolicy, PersonId};
    use ep_events::{MalformedRecordError, MemoryReplay, ReplayMode};

    use super::{config, contact, population, start};
    use crate::{NoopObserver, SimBuilder, SimError};

    fn replay() -> MemoryReplay {
        let mut r = MemoryReplay::new(ReplayMode::Dated);
        r.push(start(), contact(0, 1, 0, 0, 100.0));
        r.push_malformed(start(), MalformedRecordError::new(3, "duration \"abc\""));
        r.push(start(), contact(0, 10_000, 0, 0, 100.0));
        r
    }

    #[test]
    fn abort_by_default() {
        let mut sim = SimBuilder::new(config(), Box::new(replay())).population(population()).build().unwrap();
        let err = sim.step(&mut NoopObserver).unwrap_err();
        assert!(matches!(err, SimError::Malformed { day: 0, ref source } if source.line == 3), "{err}");
        assert_eq!(sim.current_day().0, 0);
    }

    #[test]
    fn skip_counts_records() {
        let mut cfg = config();
        cfg.on_malformed_record = MalformedRecordPolicy::Skip;
        let mut sim = SimBuilder::new(cfg, Box::new(replay())).population(population()).build().unwrap();
        let s = sim.step(&mut NoopObserver).unwrap();
        assert_eq!(s.skipped_records, 2);
        assert_eq!(s.admitted_events, 1);
    }

    #[test]
    fn failed_day_leaves_state_untouched() {
        let mut r = MemoryReplay::new(ReplayMode::Dated);
        r.push(start(), contact(0, 1, 0, 0, 100.0));
        r.push_malformed(start().succ_opt().unwrap(), MalformedRecordError::new(2, "person_b \"x\""));
        let mut sim = SimBuilder::new(config(), Box::new(r)).population(population()).build().unwrap();
        sim.people.quarantine(PersonId(42), Day(1));
        sim.step(&mut NoopObserver).unwrap();

        let before = sim.snapshot().to_json().unwrap();
        let err = sim.step(&mut NoopObserver).unwrap_err();
        assert!(matches!(err, SimError::Malformed { day: 1, .. }), "{err}");
        assert_eq!(sim.current_day().0, 1);
        assert!(sim.people().is_quarantined(PersonId(42)));
        assert_eq!(sim.snapshot().to_json().unwrap(), before);
    }

    #[test]
    fn release_day_counts_as_free() {
        let mut r = MemoryReplay::new(ReplayMode::Dated);
        r.push(start(), contact(42, 100, 7, 1, 100.0));
        let mut cfg = config();
        cfg.initial_infections = 0;
        let mut sim = SimBuilder::new(cfg, Box::new(r)).population(population()).build().unwrap();
        sim.people.quarantine(PersonId(42), Day(0));
        let s = sim.step(&mut NoopObserver).unwrap();
        assert_eq!(s.admitted_events, 1);
        assert_eq!(s.absent_events, 0);
        assert_eq!(s.released, 1);
        assert!(!sim.people().is_quarantined(PersonId(42)));
    }

    #[test]
    fn unknown_person_aborts() {
        let mut r = MemoryReplay::new(ReplayMode::Dated);
        r.push(start(), contact(0, 10_000, 0, 0, 100.0));
        let mut sim = SimBuilder::new(config(), Box::new(r)).population(population()).build().unwrap();
        assert!(matches!(sim.step(&mut NoopObserver), Err(SimError::Malformed { .. })));
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use ep_core::EpError;
    use ep_population::PopulationBuilder;

    use super::{config, population, replay};
    use crate::{SimBuilder, SimError};

    #[test]
    fn population_required() {
        assert!(matches!(SimBuilder::new(config(), replay()).build(), Err(SimError::Config(_))));
    }

    #[test]
    fn invalid_config_rejected_before_day_zero() {
        let mut cfg = config();
        cfg.days = 0;
        let err = SimBuilder::new(cfg, replay()).population(population()).build().unwrap_err();
        assert!(matches!(err, SimError::Core(EpError::Config(_))));
    }

    #[test]
    fn too_many_seeds() {
        let mut cfg = config();
        cfg.initial_infections = 10;
        let err = SimBuilder::new(cfg, replay()).population(PopulationBuilder::new(3)).build().unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn missing_progression_rule_is_fatal() {
        let mut cfg = config();
        cfg.progression.transitions.retain(|r| r.from != ep_core::DiseaseState::Critical);
        let err = SimBuilder::new(cfg, replay()).population(population()).build().unwrap_err();
        assert!(matches!(err, SimError::Progression(_)));
    }

    #[test]
    fn equipment_rate_applied() {
        let mut cfg = config();
        cfg.tracing.equipment_rate = 0.0;
        let sim = SimBuilder::new(cfg, replay()).population(population()).build().unwrap();
        assert!(sim.people().equipped.iter().all(|&e| !e));
    }
}

// ── Checkpoint / resume ───────────────────────────────────────────────────────

#[cfg(test)]
mod checkpoint {
    use super::{build, config, population, replay, run_all};
    use crate::{SimBuilder, SimError, SimSnapshot, SummaryCollector};

    #[test]
    fn resume_matches_uninterrupted_run() {
        let full = run_all(config());

        let mut sim = build(config());
        let mut first = SummaryCollector::default();
        for _ in 0..15 {
            sim.step(&mut first).unwrap();
        }
        let json = sim.snapshot().to_json().unwrap();
        drop(sim);

        let snapshot = SimSnapshot::from_json(&json).unwrap();
        assert_eq!(snapshot.next_day.0, 15);
        let mut resumed = SimBuilder::new(config(), replay()).resume(snapshot).unwrap();
        let mut rest = SummaryCollector::default();
        resumed.run(&mut rest).unwrap();

        let mut joined = first.summaries;
        joined.extend(rest.summaries);
        assert_eq!(
            serde_json::to_string(&joined).unwrap(),
            serde_json::to_string(&full).unwrap()
        );
    }

    #[test]
    fn snapshot_json_is_deterministic() {
        let mut a = build(config());
        let mut b = build(config());
        for _ in 0..10 {
            a.step(&mut crate::NoopObserver).unwrap();
            b.step(&mut crate::NoopObserver).unwrap();
        }
        assert_eq!(a.snapshot().to_json().unwrap(), b.snapshot().to_json().unwrap());
    }

    #[test]
    fn resume_rejects_other_configuration() {
        let sim = build(config());
        let snapshot = sim.snapshot();
        let mut other = config();
        other.infection.calibration_parameter = 3e-5;
        let err = SimBuilder::new(other, replay()).resume(snapshot).unwrap_err();
        assert!(matches!(err, SimError::Checkpoint(_)));
    }

    #[test]
    fn resume_rejects_short_column() {
        let sim = build(config());
        let mut snapshot = sim.snapshot();
        snapshot.people.quarantine_until.pop();
        let err = SimBuilder::new(config(), replay()).resume(snapshot).unwrap_err();
        assert!(matches!(&err, SimError::Checkpoint(m) if m.contains("quarantine_until")), "{err}");
    }

    #[test]
    fn resume_ignores_supplied_population() {
        let sim = build(config());
        let snapshot = sim.snapshot();
        let resumed = SimBuilder::new(config(), replay())
            .population(population())
            .resume(snapshot)
            .unwrap();
        assert_eq!(resumed.current_day().0, 0);
    }
}
