//! `PolicyEngine` — seeded per-event admission.
//!
//! Each event gets one keyed draw addressed by `(day, ordinal)`, where
//! `ordinal` is the event's position in the day's replay.  An event is
//! admitted iff the draw is below its activity's fraction, so fraction 0
//! admits nothing, fraction 1 admits everything, and the realised share
//! converges to the fraction as the event count grows.

use ep_core::{Day, KeyedRng, Stream};
use ep_events::ContactEvent;

use crate::Policy;

pub struct PolicyEngine {
    policy: Box<dyn Policy>,
    rng:    KeyedRng,
}

impl PolicyEngine {
    pub fn new(policy: Box<dyn Policy>, rng: KeyedRng) -> Self {
        Self { policy, rng }
    }

    #[inline]
    pub fn policy(&self) -> &dyn Policy {
        self.policy.as_ref()
    }

    /// Whether the `ordinal`-th event of `day` enters the contact model.
    pub fn admit(&self, event: &ContactEvent, ordinal: u64, day: Day) -> bool {
        let fraction = self.policy.remaining_fraction(event.activity, day);
        if fraction >= 1.0 {
            return true;
        }
        if fraction <= 0.0 || fraction.is_nan() {
            return false;
        }
        self.rng.uniform(Stream::Policy, day, ordinal, 0) < fraction
    }
}
