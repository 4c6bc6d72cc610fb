//! Run configuration.
//!
//! `EpisimConfig` is static for the duration of a run.  It is plain serde
//! data, typically loaded from JSON by the application and passed to
//! `ep_sim::SimBuilder`.  [`EpisimConfig::validate`] must succeed before any
//! simulated day runs; the builder calls it.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::distr::{DelayDistribution, MultiplierDistribution, Probability};
use crate::{ActivityRegistry, Day, DiseaseState, EpError, EpResult, KeyedRng, SimCalendar};

// ── Top level ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisimConfig {
    /// Calendar date of `Day(0)`.
    pub start_date: NaiveDate,

    /// Number of simulated days.
    pub days: u32,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Number of partitions the contact evaluation is split into.  `None`
    /// uses one partition per available core.  Never affects results.
    #[serde(default)]
    pub num_threads: Option<usize>,

    /// Known activity tags, in output column order.
    pub activity_types: Vec<String>,

    /// The activity quarantined persons may still take part in.
    #[serde(default = "default_home_activity")]
    pub home_activity: String,

    #[serde(default)]
    pub on_malformed_record: MalformedRecordPolicy,

    /// Persons moved to `exposed` on `initial_infection_day`.
    #[serde(default)]
    pub initial_infections: u32,

    #[serde(default)]
    pub initial_infection_day: u32,

    pub infection: InfectionConfig,

    #[serde(default)]
    pub population: PopulationConfig,

    #[serde(default)]
    pub progression: ProgressionConfig,

    #[serde(default)]
    pub tracing: TracingConfig,

    /// Participation restrictions, applied in order.
    #[serde(default)]
    pub policy: Vec<PolicyEntry>,
}

fn default_home_activity() -> String {
    "home".to_owned()
}

/// What to do with an event record that cannot be parsed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedRecordPolicy {
    /// Fail the run with a line-numbered diagnostic.
    #[default]
    Abort,
    /// Log the record, count it in the day summary and continue.
    Skip,
}

/// A point in time given either as a day index or as a calendar date.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DayRef {
    Day(u32),
    Date(NaiveDate),
}

impl DayRef {
    /// Resolve against `calendar`; dates before the start resolve to day 0.
    pub fn resolve(&self, calendar: &SimCalendar) -> Day {
        match *self {
            DayRef::Day(d) => Day(d),
            DayRef::Date(date) => calendar.day_of(date).unwrap_or(if date < calendar.start_date {
                Day::ZERO
            } else {
                Day(u32::MAX)
            }),
        }
    }
}

// ── Sections ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InfectionConfig {
    /// Global scale converting exposure intensity into infection hazard.
    pub calibration_parameter: f64,

    #[serde(default)]
    pub activity_corrections: Vec<CorrectionEntry>,
}

/// From `from` on, multiply the hazard of `activity` (all activities if
/// absent) by `factor`.  A later entry for the same scope replaces an
/// earlier one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrectionEntry {
    pub from: DayRef,
    #[serde(default)]
    pub activity: Option<String>,
    pub factor: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Used for persons whose infectiousness is not given in the population input.
    #[serde(default)]
    pub infectiousness: MultiplierDistribution,
    #[serde(default)]
    pub susceptibility: MultiplierDistribution,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    pub transitions: Vec<TransitionRule>,
}

/// One edge of the progression DAG with its delay and branch probability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRule {
    pub from: DiseaseState,
    pub to: DiseaseState,
    pub delay: DelayDistribution,
    /// Absent: the probability mass left over by the other rules of `from`.
    #[serde(default)]
    pub probability: Option<Probability>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Tracing, household quarantine and symptomatic isolation start on this day.
    pub start_day: u32,
    /// Length of the trailing contact window, in days.  0 disables contact tracing.
    #[serde(alias = "tracingPeriod_days")]
    pub tracing_period_days: u32,
    /// Per-contact ascertainment probability.
    pub tracing_probability: f64,
    /// Cumulative contact time with the source a contact must reach.
    #[serde(alias = "minContactDuration_sec")]
    pub min_contact_duration_sec: f64,
    /// New quarantine orders per day; `None` is unbounded.
    #[serde(alias = "tracingCapacity_per_day")]
    pub tracing_capacity_per_day: Option<u32>,
    #[serde(alias = "tracingDelay_days")]
    pub tracing_delay_days: u32,
    pub quarantine_household_members: bool,
    /// Share of persons carrying a tracing device.
    pub equipment_rate: f64,
    pub quarantine_duration_days: u32,
    /// Persons quarantine themselves on symptom onset.
    pub quarantine_symptomatic: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            start_day:                    0,
            tracing_period_days:          0,
            tracing_probability:          1.0,
            min_contact_duration_sec:     15.0 * 60.0,
            tracing_capacity_per_day:     None,
            tracing_delay_days:           0,
            quarantine_household_members: false,
            equipment_rate:               1.0,
            quarantine_duration_days:     14,
            quarantine_symptomatic:       true,
        }
    }
}

/// From `from` on, `activity` keeps `remaining_fraction` of its events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyEntry {
    #[serde(alias = "day")]
    pub from: DayRef,
    pub activity: String,
    pub remaining_fraction: f64,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for ProgressionConfig {
    /// A Covid-like progression table.
    fn default() -> Self {
        use DiseaseState::*;
        use crate::distr::AgeBand;

        let fixed = |days| DelayDistribution::Fixed { days };
        let rule = |from, to, delay, probability| TransitionRule { from, to, delay, probability };
        let bands = |v: &[(u8, f64)]| {
            Some(Probability::ByAge(
                v.iter().map(|&(min_age, probability)| AgeBand { min_age, probability }).collect(),
            ))
        };

        Self {
            transitions: vec![
                rule(Exposed, Contagious, DelayDistribution::LogNormal { mean: 4.0, sigma: 0.4 }, None),
                rule(Contagious, Symptomatic, fixed(2), Some(Probability::Constant(0.8))),
                rule(Contagious, Recovered, fixed(12), None),
                rule(Symptomatic, SeriouslySick, fixed(4), bands(&[(0, 0.01), (40, 0.03), (60, 0.1), (80, 0.2)])),
                rule(Symptomatic, Recovered, fixed(10), None),
                rule(SeriouslySick, Critical, fixed(1), bands(&[(0, 0.1), (60, 0.25)])),
                rule(SeriouslySick, Recovered, fixed(14), None),
                rule(Critical, SeriouslySickAfterCritical, fixed(9), None),
                rule(SeriouslySickAfterCritical, Recovered, fixed(7), None),
            ],
        }
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

fn check_unit(name: &str, v: f64) -> EpResult<()> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(EpError::Config(format!("{name} must be in [0, 1], got {v}")))
    }
}

fn check_non_negative(name: &str, v: f64) -> EpResult<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(EpError::Config(format!("{name} must be finite and non-negative, got {v}")))
    }
}

impl EpisimConfig {
    /// Parse a JSON configuration.  Does not validate.
    pub fn from_json_str(json: &str) -> EpResult<Self> {
        serde_json::from_str(json).map_err(|e| EpError::Parse(format!("configuration: {e}")))
    }

    pub fn from_json_file(path: &Path) -> EpResult<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Reject every configuration problem detectable before day 0.
    ///
    /// Progression reachability is checked separately when the progression
    /// model is constructed.
    pub fn validate(&self) -> EpResult<()> {
        if self.days == 0 {
            return Err(EpError::Config("days must be at least 1".into()));
        }
        if self.num_threads == Some(0) {
            return Err(EpError::Config("num_threads must be at least 1".into()));
        }
        if self.initial_infections > 0 && self.initial_infection_day >= self.days {
            return Err(EpError::Config(format!(
                "initial_infection_day {} is outside the {} simulated days",
                self.initial_infection_day, self.days
            )));
        }

        let registry = self.activity_registry()?;
        registry.require(&self.home_activity, "home_activity")?;

        check_non_negative("calibration_parameter", self.infection.calibration_parameter)?;
        for entry in &self.infection.activity_corrections {
            check_non_negative("activity correction factor", entry.factor)?;
            if let Some(name) = &entry.activity {
                registry.require(name, "infection.activity_corrections")?;
            }
        }

        for entry in &self.policy {
            registry.require(&entry.activity, "policy")?;
            check_unit("policy remaining_fraction", entry.remaining_fraction)?;
        }

        let t = &self.tracing;
        check_unit("tracing_probability", t.tracing_probability)?;
        check_unit("equipment_rate", t.equipment_rate)?;
        check_non_negative("min_contact_duration_sec", t.min_contact_duration_sec)?;

        self.population.infectiousness.sampler()?;
        self.population.susceptibility.sampler()?;

        for rule in &self.progression.transitions {
            rule.delay.sampler()?;
            if let Some(p) = &rule.probability {
                p.validate()?;
            }
        }
        Ok(())
    }

    pub fn activity_registry(&self) -> EpResult<ActivityRegistry> {
        ActivityRegistry::new(&self.activity_types)
    }

    pub fn calendar(&self) -> SimCalendar {
        SimCalendar::new(self.start_date)
    }

    pub fn keyed_rng(&self) -> KeyedRng {
        KeyedRng::new(self.seed)
    }

    /// The day after the last simulated day (exclusive upper bound).
    #[inline]
    pub fn end_day(&self) -> Day {
        Day(self.days)
    }

    /// Evaluation partitions to use.
    pub fn partitions(&self) -> usize {
        self.num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, |n| n.get()))
            .max(1)
    }
}
