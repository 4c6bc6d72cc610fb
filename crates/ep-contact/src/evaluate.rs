//! `ContactModel` — one day's infection decisions from the admitted events.
//!
//! # Algorithm
//!
//! 1. Split the admitted events into `partitions` contiguous chunks and scan
//!    each chunk (in parallel with the `parallel` feature) for
//!    infectious → susceptible pairs, producing [`Candidate`]s.
//! 2. Merge and sort candidates by
//!    `(target, source, container, start_time, event_index)`.  The order is
//!    total, so it does not depend on how events were partitioned.
//! 3. Per target, sum the hazards in that order, convert once to a
//!    probability and make a single keyed draw addressed by
//!    `(day, target)`.
//! 4. For each infected target, pick the infecting event with a second keyed
//!    draw, proportional to each candidate's hazard.
//!
//! Nothing is mutated: the result is a list of [`Infection`]s for the runner
//! to apply at the phase barrier.

use ep_core::{ActivityType, ContainerId, Day, KeyedRng, PersonId, Stream};
use ep_events::ContactEvent;
use ep_population::PersonStore;

use crate::{infection_probability, InfectionModel};

/// A possible transmission found in one event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Candidate {
    pub target:      PersonId,
    pub source:      PersonId,
    pub container:   ContainerId,
    pub activity:    ActivityType,
    pub start_time:  u32,
    /// Index into the admitted-event slice.
    pub event_index: usize,
    pub hazard:      f64,
}

impl Candidate {
    fn sort_key(&self) -> (PersonId, PersonId, ContainerId, u32, usize) {
        (self.target, self.source, self.container, self.start_time, self.event_index)
    }
}

/// A decided infection.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Infection {
    pub target:      PersonId,
    pub infector:    PersonId,
    pub activity:    ActivityType,
    pub container:   ContainerId,
    pub event_index: usize,
    /// Combined probability the draw was compared against.
    pub probability: f64,
}

pub struct ContactModel {
    model: Box<dyn InfectionModel>,
    rng:   KeyedRng,
}

impl ContactModel {
    pub fn new(model: Box<dyn InfectionModel>, rng: KeyedRng) -> Self {
        Self { model, rng }
    }

    pub fn model(&self) -> &dyn InfectionModel {
        self.model.as_ref()
    }

    /// Decide the day's infections.  The result is sorted by target and
    /// identical for every `partitions ≥ 1`.
    pub fn evaluate_day(
        &self,
        events:     &[ContactEvent],
        people:     &PersonStore,
        day:        Day,
        partitions: usize,
    ) -> Vec<Infection> {
        let mut candidates = self.candidates(events, people, day, partitions);
        candidates.sort_unstable_by_key(Candidate::sort_key);

        let infections: Vec<Infection> = candidates
            .chunk_by(|a, b| a.target == b.target)
            .filter_map(|group| self.resolve_target(group, day))
            .collect();

        tracing::debug!(
            day = day.0,
            events = events.len(),
            candidates = candidates.len(),
            infections = infections.len(),
            "contact evaluation"
        );
        infections
    }

    /// Scan events for infectious → susceptible pairs.
    pub fn candidates(
        &self,
        events:     &[ContactEvent],
        people:     &PersonStore,
        day:        Day,
        partitions: usize,
    ) -> Vec<Candidate> {
        if events.is_empty() {
            return Vec::new();
        }
        let chunk = events.len().div_ceil(partitions.max(1));
        let model = self.model.as_ref();

        #[cfg(not(feature = "parallel"))]
        {
            events
                .chunks(chunk)
                .enumerate()
                .flat_map(|(c, slice)| scan_chunk(model, slice, c * chunk, people, day))
                .collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let parts: Vec<Vec<Candidate>> = events
                .par_chunks(chunk)
                .enumerate()
                .map(|(c, slice)| scan_chunk(model, slice, c * chunk, people, day))
                .collect();
            parts.into_iter().flatten().collect()
        }
    }

    /// Single combined draw for one target's candidates (all same target,
    /// already in canonical order).
    fn resolve_target(&self, group: &[Candidate], day: Day) -> Option<Infection> {
        let first = group.first()?;
        let target = first.target;
        let total: f64 = group.iter().map(|c| c.hazard).sum();
        let probability = infection_probability(total);
        if !self.rng.bernoulli(Stream::Infection, day, target.0 as u64, 0, probability) {
            return None;
        }

        // Attribution: hazard-weighted choice.  An infinite total falls back to
        // the first infinite candidate.
        let chosen = if total.is_finite() {
            let mut remaining = self.rng.uniform(Stream::Attribution, day, target.0 as u64, 0) * total;
            group
                .iter()
                .find(|c| {
                    remaining -= c.hazard;
                    remaining < 0.0
                })
                .or(group.last())?
        } else {
            group.iter().find(|c| c.hazard.is_infinite()).unwrap_or(first)
        };

        Some(Infection {
            target,
            infector:    chosen.source,
            activity:    chosen.activity,
            container:   chosen.container,
            event_index: chosen.event_index,
            probability,
        })
    }
}

fn scan_chunk(
    model:  &dyn InfectionModel,
    events: &[ContactEvent],
    offset: usize,
    people: &PersonStore,
    day:    Day,
) -> Vec<Candidate> {
    let mut out = Vec::new();
    for (i, event) in events.iter().enumerate() {
        for (source, target) in [(event.person_a, event.person_b), (event.person_b, event.person_a)] {
            if source == target
                || !people.state[source.index()].is_infectious()
                || !people.state[target.index()].is_susceptible()
            {
                continue;
            }
            let hazard = model.hazard(event, source, target, people, day);
            if hazard > 0.0 {
                out.push(Candidate {
                    target,
                    source,
                    container:   event.container,
                    activity:    event.activity,
                    start_time:  event.start_time,
                    event_index: offset + i,
                    hazard,
                });
            }
        }
    }
    out
}
