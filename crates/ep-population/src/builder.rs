//! Fluent builder for constructing a `PersonStore` in one step.
//!
//! # Usage
//!
//! ```rust
//! use ep_core::{HouseholdId, KeyedRng, PopulationConfig};
//! use ep_population::PopulationBuilder;
//!
//! let store = PopulationBuilder::new(4)
//!     .household_of(0, HouseholdId(0))
//!     .household_of(1, HouseholdId(0))
//!     .build(&PopulationConfig::default(), &KeyedRng::new(42))
//!     .unwrap();
//!
//! assert_eq!(store.count, 4);
//! assert_eq!(store.household_members(ep_core::PersonId(1)).len(), 2);
//! ```
//!
//! Multipliers not given explicitly are sampled from the configured
//! distributions with one keyed draw per person, so the result depends only
//! on the seed and the person index.

use ep_core::{Day, HouseholdId, KeyedRng, PersonId, PopulationConfig, Stream};

use crate::{PersonStore, PopulationError, PopulationResult};

/// Which multiplier a keyed draw is for.
const INFECTIOUSNESS_DRAW: u64 = 0;
const SUSCEPTIBILITY_DRAW: u64 = 1;

/// Fluent builder for [`PersonStore`].
///
/// All arrays are pre-allocated at construction time; setters are indexed
/// assignments.  Out-of-range indices are ignored.
#[derive(Clone, Debug)]
pub struct PopulationBuilder {
    household:      Vec<HouseholdId>,
    age:            Vec<Option<u8>>,
    region:         Vec<Option<u32>>,
    infectiousness: Vec<Option<f64>>,
    susceptibility: Vec<Option<f64>>,
}

impl PopulationBuilder {
    /// Create a builder for `count` persons with no household, unknown age
    /// and region, and sampled multipliers.
    pub fn new(count: usize) -> Self {
        Self {
            household:      vec![HouseholdId::INVALID; count],
            age:            vec![None; count],
            region:         vec![None; count],
            infectiousness: vec![None; count],
            susceptibility: vec![None; count],
        }
    }

    pub fn len(&self) -> usize {
        self.household.len()
    }

    pub fn is_empty(&self) -> bool {
        self.household.is_empty()
    }

    pub fn household_of(mut self, person: usize, household: HouseholdId) -> Self {
        if let Some(slot) = self.household.get_mut(person) {
            *slot = household;
        }
        self
    }

    pub fn age_of(mut self, person: usize, age: u8) -> Self {
        if let Some(slot) = self.age.get_mut(person) {
            *slot = Some(age);
        }
        self
    }

    pub fn region_of(mut self, person: usize, region: u32) -> Self {
        if let Some(slot) = self.region.get_mut(person) {
            *slot = Some(region);
        }
        self
    }

    /// Fix the person's infectiousness instead of sampling it.
    pub fn infectiousness_of(mut self, person: usize, value: f64) -> Self {
        if let Some(slot) = self.infectiousness.get_mut(person) {
            *slot = Some(value);
        }
        self
    }

    /// Fix the person's susceptibility instead of sampling it.
    pub fn susceptibility_of(mut self, person: usize, value: f64) -> Self {
        if let Some(slot) = self.susceptibility.get_mut(person) {
            *slot = Some(value);
        }
        self
    }

    /// Construct the `PersonStore`.
    ///
    /// Every person starts `Susceptible`, free, and equipped.  Fails if a
    /// multiplier distribution is invalid or a given multiplier is negative
    /// or not finite.
    pub fn build(self, config: &PopulationConfig, rng: &KeyedRng) -> PopulationResult<PersonStore> {
        let inf_sampler = config.infectiousness.sampler()?;
        let sus_sampler = config.susceptibility.sampler()?;

        let infectiousness = resolve(&self.infectiousness, "infectiousness", |i| {
            inf_sampler.sample(&mut rng.rng_for(Stream::Population, Day::ZERO, i as u64, INFECTIOUSNESS_DRAW))
        })?;
        let susceptibility = resolve(&self.susceptibility, "susceptibility", |i| {
            sus_sampler.sample(&mut rng.rng_for(Stream::Population, Day::ZERO, i as u64, SUSCEPTIBILITY_DRAW))
        })?;

        Ok(PersonStore::new(self.household, self.age, self.region, infectiousness, susceptibility))
    }
}

/// Given values are checked, missing ones sampled.
fn resolve(
    given:  &[Option<f64>],
    name:   &'static str,
    sample: impl Fn(usize) -> f64,
) -> PopulationResult<Vec<f64>> {
    given
        .iter()
        .enumerate()
        .map(|(i, v)| match *v {
            Some(value) if !valid_multiplier(value) => {
                Err(PopulationError::InvalidMultiplier { person: PersonId(i as u32), name, value })
            }
            Some(value) => Ok(value),
            None => Ok(sample(i)),
        })
        .collect()
}

#[inline]
pub(crate) fn valid_multiplier(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
