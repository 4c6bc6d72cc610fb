//! Unit tests for ep-population.

// ── Store ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod store {
    use ep_core::{ActivityType, Day, DiseaseState, HouseholdId, KeyedRng, PersonId, PopulationConfig};

    use crate::{PersonStore, PopulationBuilder, PopulationError, QuarantineStatus};

    const HOME: ActivityType = ActivityType(0);
    const WORK: ActivityType = ActivityType(1);

    fn store(n: usize) -> PersonStore {
        PopulationBuilder::new(n)
            .household_of(0, HouseholdId(7))
            .household_of(2, HouseholdId(7))
            .household_of(3, HouseholdId(9))
            .build(&PopulationConfig::default(), &KeyedRng::new(1))
            .unwrap()
    }

    #[test]
    fn all_columns_have_count_elements() {
        let s = store(5);
        assert_eq!(s.count, 5);
        assert_eq!(s.state.len(), 5);
        assert_eq!(s.infectiousness.len(), 5);
        assert_eq!(s.quarantine_until.len(), 5);
        assert!(s.state.iter().all(|&st| st == DiseaseState::Susceptible));
        assert!(s.equipped.iter().all(|&e| e));
    }

    #[test]
    fn household_members_include_self() {
        let s = store(5);
        assert_eq!(s.household_members(PersonId(2)), &[PersonId(0), PersonId(2)]);
        assert_eq!(s.household_members(PersonId(3)), &[PersonId(3)]);
        assert!(s.household_members(PersonId(4)).is_empty());
    }

    #[test]
    fn household_index_rebuilt_after_serde() {
        let s = store(5);
        let json = serde_json::to_string(&s).unwrap();
        let mut back: PersonStore = serde_json::from_str(&json).unwrap();
        assert!(back.household_members(PersonId(0)).is_empty());
        back.rebuild_households();
        assert_eq!(back.household_members(PersonId(0)).len(), 2);
    }

    #[test]
    fn transition_follows_dag() {
        let mut s = store(2);
        let p = PersonId(1);
        assert_eq!(s.transition(p, DiseaseState::Exposed, Day(3)).unwrap(), DiseaseState::Susceptible);
        assert_eq!(s.infection_day[1], Some(Day(3)));
        assert_eq!(s.state_since[1], Day(3));
        let err = s.transition(p, DiseaseState::Recovered, Day(4)).unwrap_err();
        assert!(matches!(err, PopulationError::IllegalTransition { .. }));
        assert_eq!(s.state[1], DiseaseState::Exposed);
    }

    #[test]
    fn state_counts_by_rank() {
        let mut s = store(4);
        s.transition(PersonId(0), DiseaseState::Exposed, Day(0)).unwrap();
        let counts = s.state_counts();
        assert_eq!(counts[DiseaseState::Susceptible.rank()], 3);
        assert_eq!(counts[DiseaseState::Exposed.rank()], 1);
        assert_eq!(counts.iter().sum::<u64>(), 4);
    }

    #[test]
    fn quarantined_only_at_home() {
        let mut s = store(3);
        assert!(s.participates(PersonId(0), WORK, HOME));
        assert!(s.quarantine(PersonId(0), Day(5)));
        assert!(!s.participates(PersonId(0), WORK, HOME));
        assert!(s.participates(PersonId(0), HOME, HOME));
    }

    #[test]
    fn quarantine_ending_today_no_longer_restricts() {
        let mut s = store(2);
        s.quarantine(PersonId(0), Day(4));
        s.quarantine(PersonId(1), Day(5));
        assert!(!s.participates_on(PersonId(0), WORK, HOME, Day(3)));
        assert!(s.participates_on(PersonId(0), WORK, HOME, Day(4)));
        assert!(!s.participates_on(PersonId(1), WORK, HOME, Day(4)));
        assert!(s.participates_on(PersonId(1), HOME, HOME, Day(4)));
        // nothing was released by asking
        assert!(s.is_quarantined(PersonId(0)));
        assert!(s.quarantined_on(PersonId(1), Day(4)));
        assert!(!s.quarantined_on(PersonId(0), Day(4)));
    }

    #[test]
    fn short_column_detected() {
        let mut s = store(4);
        s.check_columns().unwrap();
        s.equipped.pop();
        let err = s.check_columns().unwrap_err();
        assert!(matches!(err, PopulationError::ColumnLength { column: "equipped", len: 3, count: 4 }), "{err}");
    }

    #[test]
    fn hospitalised_take_part_in_nothing() {
        let mut s = store(1);
        s.state[0] = DiseaseState::Critical;
        assert!(!s.participates(PersonId(0), HOME, HOME));
        assert!(!s.participates(PersonId(0), WORK, HOME));
    }

    #[test]
    fn quarantine_extends_never_shortens() {
        let mut s = store(1);
        assert!(s.quarantine(PersonId(0), Day(10)));
        assert!(!s.quarantine(PersonId(0), Day(6)));
        assert_eq!(s.quarantine_until[0], Some(Day(10)));
        assert!(!s.quarantine(PersonId(0), Day(12)));
        assert_eq!(s.quarantine_until[0], Some(Day(12)));
    }

    #[test]
    fn release_on_end_day() {
        let mut s = store(2);
        s.quarantine(PersonId(0), Day(4));
        s.quarantine(PersonId(1), Day(5));
        assert_eq!(s.release_expired(Day(3)), 0);
        assert_eq!(s.release_expired(Day(4)), 1);
        assert_eq!(s.quarantine[0], QuarantineStatus::Released);
        assert!(s.is_quarantined(PersonId(1)));
        assert_eq!(s.quarantined_count(), 1);
    }

    #[test]
    fn requarantine_after_release_starts_fresh() {
        let mut s = store(1);
        s.quarantine(PersonId(0), Day(20));
        s.quarantine[0] = QuarantineStatus::Released;
        assert!(s.quarantine(PersonId(0), Day(8)));
        assert_eq!(s.quarantine_until[0], Some(Day(8)));
    }

    #[test]
    fn equipment_extremes() {
        let rng = KeyedRng::new(3);
        let mut s = store(50);
        s.assign_equipment(0.0, &rng);
        assert!(s.equipped.iter().all(|&e| !e));
        s.assign_equipment(1.0, &rng);
        assert!(s.equipped.iter().all(|&e| e));
    }

    #[test]
    fn equipment_is_seed_determined() {
        let mut a = store(200);
        let mut b = store(200);
        a.assign_equipment(0.5, &KeyedRng::new(11));
        b.assign_equipment(0.5, &KeyedRng::new(11));
        assert_eq!(a.equipped, b.equipped);
        let n = a.equipped.iter().filter(|&&e| e).count();
        assert!(n > 50 && n < 150, "equipped = {n}");
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use ep_core::{KeyedRng, MultiplierDistribution, PersonId, PopulationConfig};

    use crate::{PopulationBuilder, PopulationError};

    fn lognormal() -> PopulationConfig {
        PopulationConfig {
            infectiousness: MultiplierDistribution::LogNormal { mean: 1.0, sigma: 0.5 },
            susceptibility: MultiplierDistribution::Constant { value: 0.7 },
        }
    }

    #[test]
    fn default_multipliers_are_one() {
        let s = PopulationBuilder::new(3).build(&PopulationConfig::default(), &KeyedRng::new(0)).unwrap();
        assert_eq!(s.infectiousness, vec![1.0; 3]);
        assert_eq!(s.susceptibility, vec![1.0; 3]);
    }

    #[test]
    fn explicit_values_win() {
        let s = PopulationBuilder::new(2)
            .infectiousness_of(1, 2.5)
            .susceptibility_of(0, 0.1)
            .build(&lognormal(), &KeyedRng::new(0))
            .unwrap();
        assert_eq!(s.infectiousness[1], 2.5);
        assert_eq!(s.susceptibility[0], 0.1);
        assert_eq!(s.susceptibility[1], 0.7);
    }

    #[test]
    fn sampled_values_depend_on_seed_only() {
        let a = PopulationBuilder::new(100).build(&lognormal(), &KeyedRng::new(5)).unwrap();
        let b = PopulationBuilder::new(100).build(&lognormal(), &KeyedRng::new(5)).unwrap();
        let c = PopulationBuilder::new(100).build(&lognormal(), &KeyedRng::new(6)).unwrap();
        assert_eq!(a.infectiousness, b.infectiousness);
        assert_ne!(a.infectiousness, c.infectiousness);
        assert!(a.infectiousness.iter().all(|&v| v > 0.0));
    }

    #[test]
    fn prefix_is_stable_under_growth() {
        let small = PopulationBuilder::new(10).build(&lognormal(), &KeyedRng::new(5)).unwrap();
        let large = PopulationBuilder::new(20).build(&lognormal(), &KeyedRng::new(5)).unwrap();
        assert_eq!(small.infectiousness[..], large.infectiousness[..10]);
    }

    #[test]
    fn invalid_distribution_fails() {
        let bad = PopulationConfig {
            infectiousness: MultiplierDistribution::LogNormal { mean: -1.0, sigma: 0.5 },
            ..PopulationConfig::default()
        };
        assert!(PopulationBuilder::new(1).build(&bad, &KeyedRng::new(0)).is_err());
    }

    #[test]
    fn negative_or_nan_multiplier_rejected() {
        let cfg = PopulationConfig::default();
        let err = PopulationBuilder::new(3).infectiousness_of(2, -0.5).build(&cfg, &KeyedRng::new(0)).unwrap_err();
        assert!(
            matches!(err, PopulationError::InvalidMultiplier { person: PersonId(2), name: "infectiousness", .. }),
            "{err}"
        );
        let err = PopulationBuilder::new(3).susceptibility_of(0, f64::NAN).build(&cfg, &KeyedRng::new(0)).unwrap_err();
        assert!(matches!(err, PopulationError::InvalidMultiplier { name: "susceptibility", .. }));
        assert!(PopulationBuilder::new(1).susceptibility_of(0, 0.0).build(&cfg, &KeyedRng::new(0)).is_ok());
    }

    #[test]
    fn out_of_range_setters_ignored() {
        let b = PopulationBuilder::new(2).age_of(9, 40).region_of(9, 1);
        assert_eq!(b.len(), 2);
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use ep_core::{HouseholdId, KeyedRng, PersonId, PopulationConfig};

    use crate::{load_population_reader, PopulationError};

    #[test]
    fn full_columns() {
        let csv = "person_id,household_id,age,region,infectiousness,susceptibility\n\
                   1,0,36,1,,\n\
                   0,0,34,1,,\n\
                   2,1,71,2,1.4,0.9\n";
        let s = load_population_reader(Cursor::new(csv))
            .unwrap()
            .build(&PopulationConfig::default(), &KeyedRng::new(0))
            .unwrap();
        assert_eq!(s.count, 3);
        assert_eq!(s.age, vec![Some(34), Some(36), Some(71)]);
        assert_eq!(s.household[2], HouseholdId(1));
        assert_eq!(s.region[0], Some(1));
        assert_eq!(s.infectiousness, vec![1.0, 1.0, 1.4]);
        assert_eq!(s.susceptibility[2], 0.9);
        assert_eq!(s.household_members(PersonId(0)), &[PersonId(0), PersonId(1)]);
    }

    #[test]
    fn only_ids() {
        let s = load_population_reader(Cursor::new("person_id\n0\n1\n"))
            .unwrap()
            .build(&PopulationConfig::default(), &KeyedRng::new(0))
            .unwrap();
        assert_eq!(s.count, 2);
        assert_eq!(s.age, vec![None, None]);
        assert_eq!(s.household, vec![HouseholdId::INVALID; 2]);
    }

    #[test]
    fn gap_rejected() {
        let err = load_population_reader(Cursor::new("person_id\n0\n2\n")).unwrap_err();
        assert!(matches!(err, PopulationError::NonDenseIds { count: 2, .. }));
    }

    #[test]
    fn duplicate_rejected() {
        let err = load_population_reader(Cursor::new("person_id\n0\n0\n")).unwrap_err();
        assert!(matches!(err, PopulationError::NonDenseIds { .. }));
    }

    #[test]
    fn negative_multiplier_rejected_at_load() {
        let csv = "person_id,infectiousness,susceptibility\n0,1.0,\n1,,-2\n";
        let err = load_population_reader(Cursor::new(csv)).unwrap_err();
        assert!(matches!(&err, PopulationError::Parse(m) if m.contains("row 2") && m.contains("susceptibility")), "{err}");
    }

    #[test]
    fn garbage_rejected() {
        let err = load_population_reader(Cursor::new("person_id,age\nx,3\n")).unwrap_err();
        assert!(matches!(err, PopulationError::Parse(_)));
    }
}
