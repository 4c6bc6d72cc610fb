//! Person-level disease compartments and the progression DAG.
//!
//! ```text
//! susceptible → exposed → contagious ─┬→ symptomatic ─┬→ seriously_sick ─┬→ critical → seriously_sick_after_critical ─┐
//!                                     │               │                  │                                          │
//!                                     └───────────────┴──────────────────┴→ recovered ←─────────────────────────────┘
//! ```
//!
//! [`DiseaseState::rank`] is a topological order: every edge goes from a
//! lower rank to a strictly higher one, so a person's state sequence can never
//! revisit a state.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiseaseState {
    #[default]
    Susceptible,
    /// Infected but not yet contagious.
    Exposed,
    /// Contagious without symptoms (yet).
    Contagious,
    /// Contagious with symptoms.
    Symptomatic,
    SeriouslySick,
    Critical,
    SeriouslySickAfterCritical,
    Recovered,
}

impl DiseaseState {
    /// Every state, in topological order.
    pub const ALL: [DiseaseState; 8] = [
        DiseaseState::Susceptible,
        DiseaseState::Exposed,
        DiseaseState::Contagious,
        DiseaseState::Symptomatic,
        DiseaseState::SeriouslySick,
        DiseaseState::Critical,
        DiseaseState::SeriouslySickAfterCritical,
        DiseaseState::Recovered,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Allowed direct successors.
    pub fn successors(self) -> &'static [DiseaseState] {
        use DiseaseState::*;
        match self {
            Susceptible                => &[Exposed],
            Exposed                    => &[Contagious],
            Contagious                 => &[Symptomatic, Recovered],
            Symptomatic                => &[SeriouslySick, Recovered],
            SeriouslySick              => &[Critical, Recovered],
            Critical                   => &[SeriouslySickAfterCritical],
            SeriouslySickAfterCritical => &[Recovered],
            Recovered                  => &[],
        }
    }

    /// Position in the topological order; doubles as a dense index.
    #[inline]
    pub fn rank(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn can_transition_to(self, to: DiseaseState) -> bool {
        self.successors().contains(&to)
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }

    /// Can transmit during a contact.
    #[inline]
    pub fn is_infectious(self) -> bool {
        matches!(self, DiseaseState::Contagious | DiseaseState::Symptomatic)
    }

    #[inline]
    pub fn is_susceptible(self) -> bool {
        self == DiseaseState::Susceptible
    }

    /// In hospital: takes part in no contact events.
    #[inline]
    pub fn is_hospitalized(self) -> bool {
        matches!(
            self,
            DiseaseState::SeriouslySick | DiseaseState::Critical | DiseaseState::SeriouslySickAfterCritical
        )
    }

    /// Entering this state triggers contact tracing.
    #[inline]
    pub fn is_traceable(self) -> bool {
        self == DiseaseState::Symptomatic
    }

    /// Snake-case name, as used in configuration and output headers.
    pub fn name(self) -> &'static str {
        use DiseaseState::*;
        match self {
            Susceptible                => "susceptible",
            Exposed                    => "exposed",
            Contagious                 => "contagious",
            Symptomatic                => "symptomatic",
            SeriouslySick              => "seriously_sick",
            Critical                   => "critical",
            SeriouslySickAfterCritical => "seriously_sick_after_critical",
            Recovered                  => "recovered",
        }
    }
}

impl fmt::Display for DiseaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
