//! Unit tests for ep-contact.

use ep_core::{ActivityType, ContainerId, DiseaseState, KeyedRng, PersonId, PopulationConfig};
use ep_events::ContactEvent;
use ep_population::{PersonStore, PopulationBuilder};

fn people(n: usize) -> PersonStore {
    PopulationBuilder::new(n).build(&PopulationConfig::default(), &KeyedRng::new(0)).unwrap()
}

fn event(a: u32, b: u32, activity: u16, duration: f64) -> ContactEvent {
    ContactEvent {
        person_a:   PersonId(a),
        person_b:   PersonId(b),
        container:  ContainerId(u64::from(a.min(b))),
        activity:   ActivityType(activity),
        start_time: 3600,
        duration,
    }
}

fn infect(store: &mut PersonStore, person: u32, state: DiseaseState) {
    store.state[person as usize] = state;
}

// ── Probability / model ───────────────────────────────────────────────────────

#[cfg(test)]
mod model {
    use ep_core::{Day, PersonId};
    use proptest::prelude::*;

    use super::{event, people};
    use crate::{infection_probability, ActivityCorrections, ContactError, InfectionModel, ViralLoadModel};

    #[test]
    fn probability_bounds() {
        assert_eq!(infection_probability(0.0), 0.0);
        assert_eq!(infection_probability(-3.0), 0.0);
        assert_eq!(infection_probability(f64::NAN), 0.0);
        assert_eq!(infection_probability(f64::INFINITY), 1.0);
        assert!((infection_probability(1.0) - (1.0 - (-1.0f64).exp())).abs() < 1e-15);
    }

    #[test]
    fn worked_example() {
        let mut s = people(2);
        s.infectiousness[0] = 1.2;
        s.susceptibility[1] = 0.9;
        let m = ViralLoadModel::new(1.2e-5, ActivityCorrections::none()).unwrap();
        let e = event(0, 1, 0, 1800.0);
        let h = m.hazard(&e, PersonId(0), PersonId(1), &s, Day(0));
        assert!((h - 1.2e-5 * 1.2 * 0.9 * 1800.0).abs() < 1e-12);
        let p = m.probability(&e, PersonId(0), PersonId(1), &s, Day(0));
        assert!((p - 0.0233).abs() < 5e-4, "p = {p}");
        assert!((p - (1.0 - (-h).exp())).abs() < 1e-12);
    }

    #[test]
    fn negative_calibration_rejected() {
        assert!(matches!(
            ViralLoadModel::new(-1.0, ActivityCorrections::none()),
            Err(ContactError::Calibration(_))
        ));
        assert!(ViralLoadModel::new(f64::NAN, ActivityCorrections::none()).is_err());
    }

    fn p(duration: f64, inf: f64, sus: f64) -> f64 {
        let mut s = people(2);
        s.infectiousness[0] = inf;
        s.susceptibility[1] = sus;
        let m = ViralLoadModel::new(1e-4, ActivityCorrections::none()).unwrap();
        m.probability(&event(0, 1, 0, duration), PersonId(0), PersonId(1), &s, Day(0))
    }

    proptest! {
        #[test]
        fn bounded(d in 0.0f64..1e7, inf in 0.0f64..50.0, sus in 0.0f64..50.0) {
            let v = p(d, inf, sus);
            prop_assert!((0.0..=1.0).contains(&v));
        }

        #[test]
        fn monotone_in_duration(d in 0.0f64..1e5, extra in 0.0f64..1e5, inf in 0.01f64..5.0, sus in 0.01f64..5.0) {
            prop_assert!(p(d + extra, inf, sus) >= p(d, inf, sus));
        }

        #[test]
        fn monotone_in_infectiousness(d in 1.0f64..1e5, inf in 0.0f64..5.0, extra in 0.0f64..5.0, sus in 0.01f64..5.0) {
            prop_assert!(p(d, inf + extra, sus) >= p(d, inf, sus));
        }

        #[test]
        fn monotone_in_susceptibility(d in 1.0f64..1e5, inf in 0.01f64..5.0, sus in 0.0f64..5.0, extra in 0.0f64..5.0) {
            prop_assert!(p(d, inf, sus + extra) >= p(d, inf, sus));
        }
    }
}

// ── Corrections ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod corrections {
    use chrono::NaiveDate;

    use ep_core::{ActivityRegistry, ActivityType, CorrectionEntry, Day, DayRef, EpError, SimCalendar};

    use crate::{ActivityCorrections, ContactError};

    fn build(entries: &[CorrectionEntry]) -> Result<ActivityCorrections, ContactError> {
        let registry = ActivityRegistry::new(&["home", "work"]).unwrap();
        let calendar = SimCalendar::new(NaiveDate::from_ymd_opt(2020, 3, 1).unwrap());
        ActivityCorrections::from_entries(entries, &registry, &calendar)
    }

    fn entry(from: u32, activity: Option<&str>, factor: f64) -> CorrectionEntry {
        CorrectionEntry { from: DayRef::Day(from), activity: activity.map(str::to_string), factor }
    }

    #[test]
    fn global_times_specific() {
        let c = build(&[entry(10, None, 0.5), entry(20, Some("work"), 2.0)]).unwrap();
        let work = ActivityType(1);
        let home = ActivityType(0);
        assert_eq!(c.factor(work, Day(5)), 1.0);
        assert_eq!(c.factor(work, Day(10)), 0.5);
        assert_eq!(c.factor(work, Day(20)), 1.0);
        assert_eq!(c.factor(home, Day(20)), 0.5);
    }

    #[test]
    fn none_is_one() {
        assert_eq!(ActivityCorrections::none().factor(ActivityType(3), Day(100)), 1.0);
    }

    #[test]
    fn unknown_activity() {
        let err = build(&[entry(0, Some("gym"), 1.0)]).unwrap_err();
        assert!(matches!(err, ContactError::Core(EpError::UnknownActivity { .. })));
    }

    #[test]
    fn negative_factor() {
        assert!(matches!(build(&[entry(0, None, -1.0)]), Err(ContactError::Correction { index: 0, .. })));
    }
}

// ── Day evaluation ────────────────────────────────────────────────────────────

#[cfg(test)]
mod evaluate {
    use ep_core::{Day, DiseaseState, KeyedRng, PersonId, Stream};
    use ep_events::ContactEvent;

    use super::{event, infect, people};
    use crate::{infection_probability, ActivityCorrections, ContactModel, ViralLoadModel};

    fn model(calibration: f64, seed: u64) -> ContactModel {
        ContactModel::new(
            Box::new(ViralLoadModel::new(calibration, ActivityCorrections::none()).unwrap()),
            KeyedRng::new(seed),
        )
    }

    #[test]
    fn only_infectious_to_susceptible() {
        let mut s = people(4);
        infect(&mut s, 0, DiseaseState::Contagious);
        infect(&mut s, 2, DiseaseState::Exposed);
        infect(&mut s, 3, DiseaseState::Recovered);
        let m = model(1.0, 1);
        let events = [event(0, 1, 0, 100.0), event(0, 2, 0, 100.0), event(3, 0, 0, 100.0), event(2, 1, 0, 100.0)];
        let c = m.candidates(&events, &s, Day(0), 1);
        assert_eq!(c.len(), 1);
        assert_eq!((c[0].source, c[0].target), (PersonId(0), PersonId(1)));
    }

    #[test]
    fn both_directions_considered() {
        let mut s = people(2);
        infect(&mut s, 1, DiseaseState::Symptomatic);
        let c = model(1.0, 1).candidates(&[event(0, 1, 0, 10.0)], &s, Day(0), 1);
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].target, PersonId(0));
    }

    #[test]
    fn certain_infection_with_huge_hazard() {
        let mut s = people(2);
        infect(&mut s, 0, DiseaseState::Contagious);
        let out = model(1e9, 3).evaluate_day(&[event(0, 1, 2, 60.0)], &s, Day(4), 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].infector, PersonId(0));
        assert_eq!(out[0].activity.0, 2);
        assert_eq!(out[0].probability, 1.0);
    }

    #[test]
    fn zero_calibration_never_infects() {
        let mut s = people(2);
        infect(&mut s, 0, DiseaseState::Contagious);
        assert!(model(0.0, 3).evaluate_day(&[event(0, 1, 0, 1e6)], &s, Day(0), 1).is_empty());
    }

    #[test]
    fn single_draw_decides() {
        let mut s = people(2);
        infect(&mut s, 0, DiseaseState::Contagious);
        s.infectiousness[0] = 1.2;
        s.susceptibility[1] = 0.9;
        let p = infection_probability(1.2e-5 * 1.2 * 0.9 * 1800.0);
        for seed in 0..300 {
            let day = Day(0);
            let r = KeyedRng::new(seed).uniform(Stream::Infection, day, 1, 0);
            let out = model(1.2e-5, seed).evaluate_day(&[event(0, 1, 0, 1800.0)], &s, day, 1);
            assert_eq!(out.len() == 1, r < p, "seed {seed}");
        }
    }

    #[test]
    fn same_day_hazards_combine() {
        let mut s = people(3);
        infect(&mut s, 0, DiseaseState::Contagious);
        infect(&mut s, 1, DiseaseState::Contagious);
        let events = [event(0, 2, 0, 1000.0), event(1, 2, 1, 3000.0)];
        let expected = infection_probability(1e-3 * 4000.0);
        let out = model(1e-3, 0).evaluate_day(&events, &s, Day(0), 1);
        assert_eq!(out.len(), 1);
        assert!((out[0].probability - expected).abs() < 1e-12);
    }

    #[test]
    fn attribution_proportional_to_hazard() {
        let mut s = people(3);
        infect(&mut s, 0, DiseaseState::Contagious);
        infect(&mut s, 1, DiseaseState::Contagious);
        // Person 1's exposure carries three times the hazard of person 0's.
        let events = [event(0, 2, 0, 1000.0), event(1, 2, 1, 3000.0)];
        let mut by_one = 0;
        let runs = 4000;
        for seed in 0..runs {
            let out = model(1.0, seed).evaluate_day(&events, &s, Day(0), 1);
            assert_eq!(out.len(), 1);
            if out[0].infector == PersonId(1) {
                assert_eq!(out[0].event_index, 1);
                by_one += 1;
            }
        }
        let share = by_one as f64 / runs as f64;
        assert!((share - 0.75).abs() < 0.04, "share = {share}");
    }

    fn crowd() -> (ep_population::PersonStore, Vec<ContactEvent>) {
        let n = 400u32;
        let mut s = people(n as usize);
        for p in (0..n).step_by(9) {
            infect(&mut s, p, DiseaseState::Contagious);
        }
        let mut events = Vec::new();
        for i in 0..3000u32 {
            let a = (i * 7919) % n;
            let b = (i * 104_729 + 13) % n;
            events.push(event(a, b, (i % 3) as u16, f64::from(300 + (i % 17) * 120)));
        }
        (s, events)
    }

    #[test]
    fn independent_of_partition_count() {
        let (s, events) = crowd();
        let m = model(2e-4, 42);
        let reference = m.evaluate_day(&events, &s, Day(5), 1);
        assert!(!reference.is_empty());
        for parts in [2, 3, 7, 16, 64, 5000] {
            assert_eq!(m.evaluate_day(&events, &s, Day(5), parts), reference, "partitions = {parts}");
        }
    }

    #[test]
    fn output_sorted_by_target_and_unique() {
        let (s, events) = crowd();
        let out = model(2e-4, 42).evaluate_day(&events, &s, Day(5), 4);
        assert!(out.windows(2).all(|w| w[0].target < w[1].target));
    }

    #[test]
    fn different_day_different_draws() {
        let (s, events) = crowd();
        let m = model(2e-4, 42);
        assert_ne!(m.evaluate_day(&events, &s, Day(5), 1), m.evaluate_day(&events, &s, Day(6), 1));
    }

    #[test]
    fn empty_day() {
        let s = people(1);
        assert!(model(1.0, 0).evaluate_day(&[], &s, Day(0), 8).is_empty());
    }
}
