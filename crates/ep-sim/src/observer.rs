//! Simulation observer trait for progress reporting and data collection.

use chrono::NaiveDate;

use ep_contact::Infection;
use ep_core::Day;
use ep_events::ContactEvent;
use ep_population::PersonStore;

use crate::DaySummary;

/// Callbacks invoked by [`Sim::step`][crate::Sim::step] at key points in the
/// day loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  Observers see state only at phase
/// boundaries; partial-day state is never exposed.
///
/// # Example — early stop
///
/// ```rust,ignore
/// struct StopWhenExtinct;
///
/// impl SimObserver for StopWhenExtinct {
///     fn should_stop(&mut self, summary: &DaySummary) -> bool {
///         summary.day.0 > 0 && summary.infectious() == 0 && summary.count(DiseaseState::Exposed) == 0
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each day, before any processing.
    fn on_day_start(&mut self, _day: Day, _date: NaiveDate) {}

    /// Called once the day's events are filtered, before contact evaluation.
    ///
    /// `admitted` are the events that reach the contact model, in replay
    /// order; `people` is the state at the start of the day.
    fn on_contacts(
        &mut self,
        _day:      Day,
        _date:     NaiveDate,
        _admitted: &[ContactEvent],
        _people:   &PersonStore,
    ) {}

    /// Called with the day's contact infections (sorted by target) after
    /// they are applied.
    fn on_infections(&mut self, _day: Day, _infections: &[Infection]) {}

    /// Called at the end of each day with its summary and the committed state.
    fn on_day_end(&mut self, _summary: &DaySummary, _people: &PersonStore) {}

    /// Called once after the last day of [`Sim::run`][crate::Sim::run].
    fn on_sim_end(&mut self, _next_day: Day) {}

    /// Checked after every completed day of `run`; `true` stops the run with
    /// consistent state.
    fn should_stop(&mut self, _summary: &DaySummary) -> bool {
        false
    }
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Keeps every `DaySummary`.
#[derive(Default)]
pub struct SummaryCollector {
    pub summaries: Vec<DaySummary>,
}

impl SimObserver for SummaryCollector {
    fn on_day_end(&mut self, summary: &DaySummary, _people: &PersonStore) {
        self.summaries.push(summary.clone());
    }
}

/// Forwards every callback to two observers; stops when either asks to.
pub struct Both<'a, A: SimObserver, B: SimObserver>(pub &'a mut A, pub &'a mut B);

impl<A: SimObserver, B: SimObserver> SimObserver for Both<'_, A, B> {
    fn on_day_start(&mut self, day: Day, date: NaiveDate) {
        self.0.on_day_start(day, date);
        self.1.on_day_start(day, date);
    }

    fn on_contacts(&mut self, day: Day, date: NaiveDate, admitted: &[ContactEvent], people: &PersonStore) {
        self.0.on_contacts(day, date, admitted, people);
        self.1.on_contacts(day, date, admitted, people);
    }

    fn on_infections(&mut self, day: Day, infections: &[Infection]) {
        self.0.on_infections(day, infections);
        self.1.on_infections(day, infections);
    }

    fn on_day_end(&mut self, summary: &DaySummary, people: &PersonStore) {
        self.0.on_day_end(summary, people);
        self.1.on_day_end(summary, people);
    }

    fn on_sim_end(&mut self, next_day: Day) {
        self.0.on_sim_end(next_day);
        self.1.on_sim_end(next_day);
    }

    fn should_stop(&mut self, summary: &DaySummary) -> bool {
        let a = self.0.should_stop(summary);
        let b = self.1.should_stop(summary);
        a || b
    }
}
