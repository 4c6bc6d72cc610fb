//! Per-activity, per-day transmissibility corrections.
//!
//! ```text
//! activityCorrection(a, d) = global(d) × specific(a, d)
//! ```
//!
//! Each factor is a step function: the latest entry with `from ≤ d`, or 1
//! before the first entry.

use ep_core::{ActivityRegistry, ActivityType, CorrectionEntry, Day, SimCalendar};

use crate::{ContactError, ContactResult};

#[derive(Clone, Debug, Default)]
pub struct ActivityCorrections {
    global:   Vec<(Day, f64)>,
    /// Indexed by `ActivityType`.
    specific: Vec<Vec<(Day, f64)>>,
}

impl ActivityCorrections {
    /// No corrections: every factor is 1.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_entries(
        entries:  &[CorrectionEntry],
        registry: &ActivityRegistry,
        calendar: &SimCalendar,
    ) -> ContactResult<Self> {
        let mut global = Vec::new();
        let mut specific = vec![Vec::new(); registry.len()];
        for (index, entry) in entries.iter().enumerate() {
            if !(entry.factor.is_finite() && entry.factor >= 0.0) {
                return Err(ContactError::Correction { index, factor: entry.factor });
            }
            let step = (entry.from.resolve(calendar), entry.factor);
            match &entry.activity {
                Some(name) => {
                    let a = registry.require(name, "activity correction")?;
                    specific[a.index()].push(step);
                }
                None => global.push(step),
            }
        }
        global.sort_by_key(|&(d, _)| d);
        for list in &mut specific {
            list.sort_by_key(|&(d, _)| d);
        }
        Ok(Self { global, specific })
    }

    #[inline]
    pub fn factor(&self, activity: ActivityType, day: Day) -> f64 {
        let specific = self.specific.get(activity.index()).map_or(1.0, |l| step_at(l, day));
        step_at(&self.global, day) * specific
    }
}

fn step_at(steps: &[(Day, f64)], day: Day) -> f64 {
    match steps.partition_point(|&(from, _)| from <= day) {
        0 => 1.0,
        n => steps[n - 1].1,
    }
}
