//! The `ProgressionModel` trait and the configuration-driven model.
//!
//! For every state a person enters, the model picks the next state (branch
//! choice, possibly age-dependent) and the day it is entered (sampled delay,
//! rounded, at least one day).  Both draws are keyed by
//! `(entered day, person, state)`, so they do not depend on processing order.

use ep_core::distr::delay_days;
use ep_core::{Day, DiseaseState, KeyedRng, PersonId, Probability, ProgressionConfig, Sampler, Stream};
use ep_population::{PersonStore, ScheduledTransition};

use crate::{ProgressionError, ProgressionResult};

/// Tolerance for branch-probability sums.
const SUM_TOLERANCE: f64 = 1e-9;

// ── Trait ─────────────────────────────────────────────────────────────────────

/// Pluggable disease course.
///
/// # Contract
///
/// - The returned transition is an edge of the progression graph and falls
///   strictly after `entered`.
/// - Deterministic given `rng`; no interior mutability.
pub trait ProgressionModel: Send + Sync {
    /// Next transition for `person`, who entered `state` on `entered`.
    /// `None` for terminal states.
    fn next_transition(
        &self,
        person:  PersonId,
        state:   DiseaseState,
        entered: Day,
        people:  &PersonStore,
        rng:     &KeyedRng,
    ) -> Option<ScheduledTransition>;
}

// ── Configured model ──────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct Branch {
    to:          DiseaseState,
    delay:       Sampler,
    /// `None` takes the remaining probability mass.
    probability: Option<Probability>,
}

/// Transition rules compiled and validated from [`ProgressionConfig`].
#[derive(Clone, Debug)]
pub struct ConfiguredProgression {
    /// Indexed by `DiseaseState::rank` of the source state.
    branches: Vec<Vec<Branch>>,
}

impl ConfiguredProgression {
    /// Compile the rules.  Fails on edges outside the progression graph,
    /// duplicate rules, invalid distributions or probabilities, and on any
    /// non-terminal state reachable from `exposed` that has no rule.
    pub fn new(config: &ProgressionConfig) -> ProgressionResult<Self> {
        let mut branches: Vec<Vec<Branch>> = vec![Vec::new(); DiseaseState::COUNT];

        for rule in &config.transitions {
            if !rule.from.can_transition_to(rule.to) {
                return Err(ProgressionError::IllegalEdge { from: rule.from, to: rule.to });
            }
            let list = &mut branches[rule.from.rank()];
            if list.iter().any(|b| b.to == rule.to) {
                return Err(ProgressionError::DuplicateRule { from: rule.from, to: rule.to });
            }
            if let Some(p) = &rule.probability {
                p.validate()?;
            }
            list.push(Branch {
                to:          rule.to,
                delay:       rule.delay.sampler()?,
                probability: rule.probability.clone(),
            });
        }

        let model = Self { branches };
        model.check_reachable()?;
        for state in DiseaseState::ALL {
            model.check_probabilities(state)?;
        }
        Ok(model)
    }

    fn check_reachable(&self) -> ProgressionResult<()> {
        let mut seen = [false; DiseaseState::COUNT];
        let mut stack = vec![DiseaseState::Exposed];
        while let Some(state) = stack.pop() {
            if std::mem::replace(&mut seen[state.rank()], true) {
                continue;
            }
            let out = &self.branches[state.rank()];
            if out.is_empty() && !state.is_terminal() {
                return Err(ProgressionError::MissingTransition(state));
            }
            stack.extend(out.iter().map(|b| b.to));
        }
        Ok(())
    }

    fn check_probabilities(&self, state: DiseaseState) -> ProgressionResult<()> {
        let out = &self.branches[state.rank()];
        if out.is_empty() {
            return Ok(());
        }
        let defaults = out.iter().filter(|b| b.probability.is_none()).count();
        if defaults > 1 {
            return Err(ProgressionError::AmbiguousDefault(state));
        }

        let mut ages: Vec<u8> = vec![0];
        for p in out.iter().filter_map(|b| b.probability.as_ref()) {
            ages.extend(p.breakpoints());
        }
        ages.sort_unstable();
        ages.dedup();

        for age in ages {
            let sum: f64 = out
                .iter()
                .filter_map(|b| b.probability.as_ref())
                .map(|p| p.for_age(Some(age)))
                .sum();
            let ok = if defaults == 1 { sum <= 1.0 + SUM_TOLERANCE } else { (sum - 1.0).abs() <= SUM_TOLERANCE };
            if !ok {
                let expected = if defaults == 1 { "at most 1" } else { "1" };
                return Err(ProgressionError::ProbabilitySum { state, age, sum, expected });
            }
        }
        Ok(())
    }

    /// Pick the branch for one uniform draw `u ∈ [0, 1)`.
    fn choose<'a>(&'a self, out: &'a [Branch], age: Option<u8>, u: f64) -> Option<&'a Branch> {
        let mut cumulative = 0.0;
        for branch in out {
            if let Some(p) = &branch.probability {
                cumulative += p.for_age(age);
                if u < cumulative {
                    return Some(branch);
                }
            }
        }
        out.iter()
            .find(|b| b.probability.is_none())
            .or_else(|| out.iter().rev().find(|b| b.probability.as_ref().is_some_and(|p| p.for_age(age) > 0.0)))
    }
}

impl ProgressionModel for ConfiguredProgression {
    fn next_transition(
        &self,
        person:  PersonId,
        state:   DiseaseState,
        entered: Day,
        people:  &PersonStore,
        rng:     &KeyedRng,
    ) -> Option<ScheduledTransition> {
        let out = &self.branches[state.rank()];
        let key = (u64::from(person.0), state.rank() as u64);
        let branch = match out.len() {
            0 => return None,
            1 => &out[0],
            _ => {
                let u = rng.uniform(Stream::Progression, entered, key.0, key.1);
                self.choose(out, people.age[person.index()], u)?
            }
        };
        let sample = branch.delay.sample(&mut rng.rng_for(Stream::Delay, entered, key.0, key.1));
        Some(ScheduledTransition {
            to:  branch.to,
            day: entered.offset(delay_days(sample)),
        })
    }
}
