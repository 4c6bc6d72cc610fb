//! `ProgressionEngine` — applies infections and fires due transitions.

use ep_core::{Day, DiseaseState, KeyedRng, PersonId};
use ep_population::PersonStore;

use crate::{ProgressionModel, ProgressionResult, TransitionQueue};

/// One state change that happened during `advance`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TransitionRecord {
    pub person: PersonId,
    pub from:   DiseaseState,
    pub to:     DiseaseState,
    pub day:    Day,
}

pub struct ProgressionEngine {
    model: Box<dyn ProgressionModel>,
    queue: TransitionQueue,
    rng:   KeyedRng,
}

impl ProgressionEngine {
    pub fn new(model: Box<dyn ProgressionModel>, rng: KeyedRng) -> Self {
        Self { model, queue: TransitionQueue::new(), rng }
    }

    /// Engine positioned on a restored population: the queue is rebuilt from
    /// the pending transitions stored per person.
    pub fn resume(model: Box<dyn ProgressionModel>, rng: KeyedRng, people: &PersonStore) -> Self {
        Self { model, queue: TransitionQueue::from_store(people), rng }
    }

    pub fn queue(&self) -> &TransitionQueue {
        &self.queue
    }

    /// Move a susceptible `person` to `exposed` on `day` and schedule the
    /// next transition.  Returns `false` (and does nothing) if the person is
    /// not susceptible.
    pub fn infect(&mut self, people: &mut PersonStore, person: PersonId, day: Day) -> ProgressionResult<bool> {
        if !people.state[person.index()].is_susceptible() {
            return Ok(false);
        }
        people.transition(person, DiseaseState::Exposed, day)?;
        self.schedule(people, person, DiseaseState::Exposed, day, None);
        Ok(true)
    }

    /// Fire every transition due on or before `day`, ascending by person.
    ///
    /// Idempotent per day: a second call for the same day finds nothing due.
    /// Chains of transitions missed by skipped days are replayed in order,
    /// each on its own scheduled day.
    pub fn advance(&mut self, people: &mut PersonStore, day: Day) -> ProgressionResult<Vec<TransitionRecord>> {
        let mut fired = Vec::new();
        for person in self.queue.drain_through(day) {
            let i = person.index();
            while let Some(next) = people.next_transition[i].filter(|t| t.day <= day) {
                people.next_transition[i] = None;
                let from = people.transition(person, next.to, next.day)?;
                fired.push(TransitionRecord { person, from, to: next.to, day: next.day });
                self.schedule(people, person, next.to, next.day, Some(day));
            }
        }
        if !fired.is_empty() {
            tracing::debug!(day = day.0, transitions = fired.len(), "progression advanced");
        }
        Ok(fired)
    }

    /// Draw and store the next transition.  Transitions due on or before
    /// `advancing` are fired by the running `advance` and not queued.
    fn schedule(
        &mut self,
        people:    &mut PersonStore,
        person:    PersonId,
        state:     DiseaseState,
        entered:   Day,
        advancing: Option<Day>,
    ) {
        let next = self.model.next_transition(person, state, entered, people, &self.rng);
        people.next_transition[person.index()] = next;
        if let Some(t) = next.filter(|t| advancing.map_or(true, |d| t.day > d)) {
            self.queue.push(t.day, person);
        }
    }
}
