//! `Policy` — day-indexed participation fractions per activity type.
//!
//! A policy answers one question: what fraction of the events of activity
//! type `a` survives on day `d`?  Policies compose multiplicatively with
//! [`PolicyExt::and`], so e.g. a school closure and a leisure cap can be
//! configured independently.

use ep_core::{ActivityRegistry, ActivityType, Day, PolicyEntry, SimCalendar};

use crate::{PolicyError, PolicyResult};

// ── Trait ─────────────────────────────────────────────────────────────────────

/// Remaining participation fraction per activity type and day.
///
/// # Contract
///
/// - Returns a value in `[0, 1]`.
/// - Pure: the same `(activity, day)` always yields the same fraction.
pub trait Policy: Send + Sync {
    fn remaining_fraction(&self, activity: ActivityType, day: Day) -> f64;
}

// ── No restrictions ───────────────────────────────────────────────────────────

/// Admits everything.
pub struct NoRestrictions;

impl Policy for NoRestrictions {
    #[inline]
    fn remaining_fraction(&self, _activity: ActivityType, _day: Day) -> f64 {
        1.0
    }
}

// ── Fixed table ───────────────────────────────────────────────────────────────

/// Step function per activity type: the latest entry with `from ≤ day` wins;
/// before the first entry the fraction is 1.
#[derive(Clone, Debug)]
pub struct FixedPolicy {
    /// Indexed by `ActivityType`; each list sorted by day.
    steps: Vec<Vec<(Day, f64)>>,
}

impl FixedPolicy {
    /// Build from configuration entries.  Unknown activity types and
    /// fractions outside `[0, 1]` are rejected here, before any day runs.
    ///
    /// Entries may come in any order; for two entries with the same activity
    /// and day, the later one wins.
    pub fn from_entries(
        entries:  &[PolicyEntry],
        registry: &ActivityRegistry,
        calendar: &SimCalendar,
    ) -> PolicyResult<Self> {
        let mut steps = vec![Vec::new(); registry.len()];
        for (index, entry) in entries.iter().enumerate() {
            let fraction = entry.remaining_fraction;
            if !(0.0..=1.0).contains(&fraction) {
                return Err(PolicyError::FractionOutOfRange { index, fraction });
            }
            let activity = registry.require(&entry.activity, "policy")?;
            steps[activity.index()].push((entry.from.resolve(calendar), fraction));
        }
        for list in &mut steps {
            // Stable: equal days keep input order, so the last one is found last.
            list.sort_by_key(|&(day, _)| day);
        }
        Ok(Self { steps })
    }

    pub fn is_empty(&self) -> bool {
        self.steps.iter().all(Vec::is_empty)
    }
}

impl Policy for FixedPolicy {
    fn remaining_fraction(&self, activity: ActivityType, day: Day) -> f64 {
        let Some(list) = self.steps.get(activity.index()) else {
            return 1.0;
        };
        let n = list.partition_point(|&(from, _)| from <= day);
        if n == 0 { 1.0 } else { list[n - 1].1 }
    }
}

// ── Combined ──────────────────────────────────────────────────────────────────

/// Product of two policies' fractions.
pub struct Combined<A: Policy, B: Policy> {
    first:  A,
    second: B,
}

impl<A: Policy, B: Policy> Policy for Combined<A, B> {
    fn remaining_fraction(&self, activity: ActivityType, day: Day) -> f64 {
        self.first.remaining_fraction(activity, day) * self.second.remaining_fraction(activity, day)
    }
}

/// Extension trait that adds `.and(other)` to any `Policy`.
pub trait PolicyExt: Policy + Sized {
    fn and<B: Policy>(self, other: B) -> Combined<Self, B> {
        Combined { first: self, second: other }
    }
}

impl<P: Policy + Sized> PolicyExt for P {}

impl Policy for Box<dyn Policy> {
    #[inline]
    fn remaining_fraction(&self, activity: ActivityType, day: Day) -> f64 {
        (**self).remaining_fraction(activity, day)
    }
}
