//! The `InfectionModel` trait and the viral-load model.
//!
//! ```text
//! p = 1 − exp(−calibration × infectiousness(i) × susceptibility(j)
//!                × duration × activityCorrection(type, day))
//! ```
//!
//! Models return the *hazard* (the exponent); [`infection_probability`]
//! turns it into a probability.  Hazards of several events add up before the
//! conversion, so same-day exposures combine into one probability.

use ep_core::{Day, PersonId};
use ep_events::ContactEvent;
use ep_population::PersonStore;

use crate::{ActivityCorrections, ContactError, ContactResult};

// ── Trait ─────────────────────────────────────────────────────────────────────

/// Pluggable transmission model.
///
/// # Contract
///
/// - `hazard` is `≥ 0` and never NaN.
/// - Pure: no interior mutability, no randomness.  The contact model may
///   call it from several Rayon workers at once.
pub trait InfectionModel: Send + Sync {
    /// Hazard that `infector` transmits to `target` during `event`.
    fn hazard(
        &self,
        event:    &ContactEvent,
        infector: PersonId,
        target:   PersonId,
        people:   &PersonStore,
        day:      Day,
    ) -> f64;

    /// Probability for this single event.
    fn probability(
        &self,
        event:    &ContactEvent,
        infector: PersonId,
        target:   PersonId,
        people:   &PersonStore,
        day:      Day,
    ) -> f64 {
        infection_probability(self.hazard(event, infector, target, people, day))
    }
}

/// `1 − exp(−hazard)`, clamped to `[0, 1]`.  Non-positive and NaN hazards
/// give 0.
#[inline]
pub fn infection_probability(hazard: f64) -> f64 {
    if hazard > 0.0 {
        (-(-hazard).exp_m1()).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

// ── Viral-load model ──────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct ViralLoadModel {
    calibration: f64,
    corrections: ActivityCorrections,
}

impl ViralLoadModel {
    pub fn new(calibration: f64, corrections: ActivityCorrections) -> ContactResult<Self> {
        if !(calibration.is_finite() && calibration >= 0.0) {
            return Err(ContactError::Calibration(calibration));
        }
        Ok(Self { calibration, corrections })
    }

    pub fn calibration(&self) -> f64 {
        self.calibration
    }

    pub fn corrections(&self) -> &ActivityCorrections {
        &self.corrections
    }
}

impl InfectionModel for ViralLoadModel {
    #[inline]
    fn hazard(
        &self,
        event:    &ContactEvent,
        infector: PersonId,
        target:   PersonId,
        people:   &PersonStore,
        day:      Day,
    ) -> f64 {
        let h = self.calibration
            * people.infectiousness[infector.index()]
            * people.susceptibility[target.index()]
            * event.duration
            * self.corrections.factor(event.activity, day);
        if h.is_nan() { 0.0 } else { h.max(0.0) }
    }
}
