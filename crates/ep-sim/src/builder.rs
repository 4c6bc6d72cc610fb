//! Fluent builder for constructing a [`Sim`].

use ep_contact::{ActivityCorrections, ContactModel, InfectionModel, ViralLoadModel};
use ep_core::{Day, EpisimConfig};
use ep_events::EventReplay;
use ep_policy::{FixedPolicy, Policy, PolicyEngine};
use ep_population::{PersonStore, PopulationBuilder};
use ep_progression::{ConfiguredProgression, ProgressionEngine, ProgressionModel};
use ep_tracing::TracingEngine;

use crate::snapshot::config_fingerprint;
use crate::{RunState, Sim, SimError, SimResult, SimSnapshot};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`EpisimConfig`] — horizon, seed, activity types, model parameters, …
/// - `Box<dyn EventReplay>` — the contact stream
/// - a population, for [`build`](Self::build) (a snapshot carries its own
///   for [`resume`](Self::resume))
///
/// # Optional inputs (have defaults)
///
/// | Method                    | Default                                    |
/// |---------------------------|--------------------------------------------|
/// | `.policy(p)`              | `FixedPolicy` from `config.policy`         |
/// | `.infection_model(m)`     | `ViralLoadModel` from `config.infection`   |
/// | `.progression_model(m)`   | `ConfiguredProgression` from `config.progression` |
///
/// # Example
///
/// ```rust,ignore
/// let population = load_population_csv(Path::new("persons.csv"))?;
/// let replay = CsvEventReplay::new("events.csv", config.activity_registry()?, ReplayMode::Cyclic)?;
/// let mut sim = SimBuilder::new(config, Box::new(replay))
///     .population(population)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:      EpisimConfig,
    replay:      Box<dyn EventReplay>,
    population:  Option<PopulationBuilder>,
    policy:      Option<Box<dyn Policy>>,
    infection:   Option<Box<dyn InfectionModel>>,
    progression: Option<Box<dyn ProgressionModel>>,
}

impl SimBuilder {
    pub fn new(config: EpisimConfig, replay: Box<dyn EventReplay>) -> Self {
        Self {
            config,
            replay,
            population:  None,
            policy:      None,
            infection:   None,
            progression: None,
        }
    }

    pub fn population(mut self, population: PopulationBuilder) -> Self {
        self.population = Some(population);
        self
    }

    /// Replace the configured policy table.
    pub fn policy(mut self, policy: Box<dyn Policy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Replace the viral-load transmission model.
    pub fn infection_model(mut self, model: Box<dyn InfectionModel>) -> Self {
        self.infection = Some(model);
        self
    }

    /// Replace the configured progression rules.
    pub fn progression_model(mut self, model: Box<dyn ProgressionModel>) -> Self {
        self.progression = Some(model);
        self
    }

    /// Validate the configuration, build the population and every component,
    /// and return a `Sim` positioned at day 0.
    pub fn build(mut self) -> SimResult<Sim> {
        self.config.validate()?;
        let rng = self.config.keyed_rng();
        let population = self
            .population
            .take()
            .ok_or_else(|| SimError::Config("no population supplied".into()))?;
        let mut people = population.build(&self.config.population, &rng)?;
        people.assign_equipment(self.config.tracing.equipment_rate, &rng);

        if self.config.initial_infections as usize > people.count {
            return Err(SimError::Config(format!(
                "initial_infections {} exceeds population {}",
                self.config.initial_infections, people.count
            )));
        }

        let progression = ProgressionEngine::new(self.take_progression_model()?, rng);
        let tracing = TracingEngine::new(&self.config.tracing, rng);
        let sim = self.assemble(people, progression, tracing, Day::ZERO)?;
        tracing::info!(
            persons = sim.people.count,
            days = sim.config.days,
            partitions = sim.partitions,
            "simulation built"
        );
        Ok(sim)
    }

    /// Rebuild a `Sim` at the snapshot's day.
    ///
    /// The configuration must be the one the snapshot was taken with.
    pub fn resume(mut self, snapshot: SimSnapshot) -> SimResult<Sim> {
        self.config.validate()?;
        let fingerprint = config_fingerprint(&self.config)?;
        if fingerprint != snapshot.config_fingerprint || snapshot.seed != self.config.seed {
            return Err(SimError::Checkpoint("snapshot was taken with a different configuration".into()));
        }
        let mut people = snapshot.people;
        people.check_columns().map_err(|e| SimError::Checkpoint(e.to_string()))?;
        people.rebuild_households();

        let rng = self.config.keyed_rng();
        let progression = ProgressionEngine::resume(self.take_progression_model()?, rng, &people);
        let tracing = TracingEngine::resume(&self.config.tracing, rng, snapshot.tracing);
        let sim = self.assemble(people, progression, tracing, snapshot.next_day)?;
        tracing::info!(day = sim.day.0, persons = sim.people.count, "simulation resumed");
        Ok(sim)
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn take_progression_model(&mut self) -> SimResult<Box<dyn ProgressionModel>> {
        match self.progression.take() {
            Some(m) => Ok(m),
            None => Ok(Box::new(ConfiguredProgression::new(&self.config.progression)?)),
        }
    }

    fn assemble(
        self,
        people:      PersonStore,
        progression: ProgressionEngine,
        tracing:     TracingEngine,
        day:         Day,
    ) -> SimResult<Sim> {
        let config = self.config;
        let registry = config.activity_registry()?;
        let calendar = config.calendar();
        let rng = config.keyed_rng();
        let home = registry.require(&config.home_activity, "home_activity")?;

        let policy = match self.policy {
            Some(p) => p,
            None => Box::new(FixedPolicy::from_entries(&config.policy, &registry, &calendar)?),
        };
        let infection = match self.infection {
            Some(m) => m,
            None => {
                let corrections =
                    ActivityCorrections::from_entries(&config.infection.activity_corrections, &registry, &calendar)?;
                Box::new(ViralLoadModel::new(config.infection.calibration_parameter, corrections)?)
            }
        };

        let end = config.end_day();
        Ok(Sim {
            fingerprint: config_fingerprint(&config)?,
            partitions:  config.partitions(),
            registry,
            calendar,
            rng,
            home,
            people,
            replay:      self.replay,
            policy:      PolicyEngine::new(policy, rng),
            contact:     ContactModel::new(infection, rng),
            progression,
            tracing,
            day,
            state:       if day >= end { RunState::Completed } else { RunState::Initialized },
            config,
        })
    }
}
