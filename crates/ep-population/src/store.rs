//! Person storage: `PersonStore` (Structure-of-Arrays).
//!
//! Every `Vec` field has exactly `count` elements; the `PersonId` value is the
//! index into all of them:
//!
//! ```ignore
//! let s = store.state[person.index()];  // O(1), cache-friendly
//! ```
//!
//! The store is created once at population load and never shrinks.  During a
//! day step it is owned by the runner and lent to each component in turn;
//! components read it freely but mutate it only at phase barriers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ep_core::{ActivityType, Day, DiseaseState, HouseholdId, KeyedRng, PersonId, Stream};

use crate::{PopulationError, PopulationResult};

/// A pending disease transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTransition {
    pub to:  DiseaseState,
    pub day: Day,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarantineStatus {
    #[default]
    Free,
    Quarantined,
    /// Was quarantined at least once and has been released.
    Released,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersonStore {
    /// Number of persons.  Equals the length of every SoA `Vec`.
    pub count: usize,

    // ── Disease state ─────────────────────────────────────────────────────
    pub state: Vec<DiseaseState>,
    /// Day the current state was entered.
    pub state_since: Vec<Day>,
    pub infection_day: Vec<Option<Day>>,
    /// At most one pending transition per person.
    pub next_transition: Vec<Option<ScheduledTransition>>,

    // ── Transmission multipliers ──────────────────────────────────────────
    /// Viral load.
    pub infectiousness: Vec<f64>,
    pub susceptibility: Vec<f64>,

    // ── Attributes ────────────────────────────────────────────────────────
    /// `HouseholdId::INVALID` for persons without a household.
    pub household: Vec<HouseholdId>,
    pub age: Vec<Option<u8>>,
    pub region: Vec<Option<u32>>,
    /// Carries a tracing device.
    pub equipped: Vec<bool>,

    // ── Quarantine ────────────────────────────────────────────────────────
    pub quarantine: Vec<QuarantineStatus>,
    pub quarantine_until: Vec<Option<Day>>,

    /// Household → members, ascending.  Derived; rebuilt after deserializing.
    #[serde(skip)]
    households: BTreeMap<HouseholdId, Vec<PersonId>>,
}

impl PersonStore {
    // ── Package-private constructor used by PopulationBuilder ─────────────

    pub(crate) fn new(
        household:      Vec<HouseholdId>,
        age:            Vec<Option<u8>>,
        region:         Vec<Option<u32>>,
        infectiousness: Vec<f64>,
        susceptibility: Vec<f64>,
    ) -> Self {
        let count = household.len();
        let mut store = Self {
            count,
            state:            vec![DiseaseState::Susceptible; count],
            state_since:      vec![Day::ZERO; count],
            infection_day:    vec![None; count],
            next_transition:  vec![None; count],
            infectiousness,
            susceptibility,
            household,
            age,
            region,
            equipped:         vec![true; count],
            quarantine:       vec![QuarantineStatus::Free; count],
            quarantine_until: vec![None; count],
            households:       BTreeMap::new(),
        };
        store.rebuild_households();
        store
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn contains(&self, person: PersonId) -> bool {
        person.index() < self.count
    }

    /// Check that every SoA column holds exactly `count` entries, as required
    /// after deserializing a store.
    pub fn check_columns(&self) -> PopulationResult<()> {
        let columns: [(&'static str, usize); 12] = [
            ("state", self.state.len()),
            ("state_since", self.state_since.len()),
            ("infection_day", self.infection_day.len()),
            ("next_transition", self.next_transition.len()),
            ("infectiousness", self.infectiousness.len()),
            ("susceptibility", self.susceptibility.len()),
            ("household", self.household.len()),
            ("age", self.age.len()),
            ("region", self.region.len()),
            ("equipped", self.equipped.len()),
            ("quarantine", self.quarantine.len()),
            ("quarantine_until", self.quarantine_until.len()),
        ];
        match columns.iter().find(|&&(_, len)| len != self.count) {
            Some(&(column, len)) => Err(PopulationError::ColumnLength { column, len, count: self.count }),
            None => Ok(()),
        }
    }

    /// Iterator over all `PersonId`s in ascending index order.
    pub fn person_ids(&self) -> impl Iterator<Item = PersonId> + '_ {
        (0..self.count as u32).map(PersonId)
    }

    /// Recompute the household index from `household`.
    pub fn rebuild_households(&mut self) {
        self.households.clear();
        for (i, &hh) in self.household.iter().enumerate() {
            if hh != HouseholdId::INVALID {
                self.households.entry(hh).or_default().push(PersonId(i as u32));
            }
        }
    }

    /// All members of `person`'s household, including `person`, ascending.
    /// Empty if the person has no household.
    pub fn household_members(&self, person: PersonId) -> &[PersonId] {
        self.households
            .get(&self.household[person.index()])
            .map_or(&[], Vec::as_slice)
    }

    // ── Disease state ─────────────────────────────────────────────────────

    /// Move `person` to `to` on `day`, enforcing the progression DAG.
    ///
    /// Returns the state that was left.
    pub fn transition(&mut self, person: PersonId, to: DiseaseState, day: Day) -> PopulationResult<DiseaseState> {
        let i = person.index();
        let from = self.state[i];
        if !from.can_transition_to(to) {
            return Err(PopulationError::IllegalTransition { person, from, to });
        }
        self.state[i] = to;
        self.state_since[i] = day;
        if to == DiseaseState::Exposed {
            self.infection_day[i] = Some(day);
        }
        Ok(from)
    }

    /// Head-count per disease state, indexed by `DiseaseState::rank`.
    pub fn state_counts(&self) -> [u64; DiseaseState::COUNT] {
        let mut counts = [0u64; DiseaseState::COUNT];
        for s in &self.state {
            counts[s.rank()] += 1;
        }
        counts
    }

    // ── Participation ─────────────────────────────────────────────────────

    /// Whether `person` takes part in an event of `activity` today.
    ///
    /// Hospitalised persons take part in nothing; quarantined persons only in
    /// `home` events.
    #[inline]
    pub fn participates(&self, person: PersonId, activity: ActivityType, home: ActivityType) -> bool {
        let i = person.index();
        if self.state[i].is_hospitalized() {
            return false;
        }
        self.quarantine[i] != QuarantineStatus::Quarantined || activity == home
    }

    /// [`participates`][Self::participates] as of `day`, before that day's
    /// releases are applied: a quarantine ending on `day` no longer counts.
    #[inline]
    pub fn participates_on(&self, person: PersonId, activity: ActivityType, home: ActivityType, day: Day) -> bool {
        if self.state[person.index()].is_hospitalized() {
            return false;
        }
        activity == home || !self.quarantined_on(person, day)
    }

    // ── Quarantine ────────────────────────────────────────────────────────

    #[inline]
    pub fn is_quarantined(&self, person: PersonId) -> bool {
        self.quarantine[person.index()] == QuarantineStatus::Quarantined
    }

    /// Quarantined and not due for release on `day`.
    #[inline]
    pub fn quarantined_on(&self, person: PersonId, day: Day) -> bool {
        let i = person.index();
        self.quarantine[i] == QuarantineStatus::Quarantined && !self.quarantine_until[i].is_some_and(|u| u <= day)
    }

    /// Quarantine `person` until `until` (exclusive).  An existing quarantine
    /// is extended, never shortened.
    ///
    /// Returns `true` if the person was not quarantined before.
    pub fn quarantine(&mut self, person: PersonId, until: Day) -> bool {
        let i = person.index();
        let fresh = self.quarantine[i] != QuarantineStatus::Quarantined;
        let end = match self.quarantine_until[i] {
            Some(current) if !fresh => current.max(until),
            _ => until,
        };
        self.quarantine[i] = QuarantineStatus::Quarantined;
        self.quarantine_until[i] = Some(end);
        fresh
    }

    /// Release every person whose quarantine ends on or before `day`.
    /// Returns the number released.
    pub fn release_expired(&mut self, day: Day) -> usize {
        let mut released = 0;
        for i in 0..self.count {
            if self.quarantine[i] == QuarantineStatus::Quarantined
                && self.quarantine_until[i].is_some_and(|u| u <= day)
            {
                self.quarantine[i] = QuarantineStatus::Released;
                released += 1;
            }
        }
        released
    }

    pub fn quarantined_count(&self) -> u64 {
        self.quarantine.iter().filter(|&&q| q == QuarantineStatus::Quarantined).count() as u64
    }

    // ── Tracing devices ───────────────────────────────────────────────────

    /// Decide once per person, by keyed draw, whether they carry a tracing
    /// device.
    pub fn assign_equipment(&mut self, rate: f64, rng: &KeyedRng) {
        for (i, slot) in self.equipped.iter_mut().enumerate() {
            *slot = rng.bernoulli(Stream::Equipment, Day::ZERO, i as u64, 0, rate);
        }
    }
}
