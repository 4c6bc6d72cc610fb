use ep_core::{ActivityType, ContainerId, PersonId};

/// One co-presence of two persons in a shared container.
///
/// Produced by an [`EventReplay`](crate::EventReplay) for exactly one
/// simulated day and discarded at the end of it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactEvent {
    pub person_a:   PersonId,
    pub person_b:   PersonId,
    pub container:  ContainerId,
    pub activity:   ActivityType,
    /// Seconds since midnight.
    pub start_time: u32,
    /// Seconds of co-presence.
    pub duration:   f64,
}

impl ContactEvent {
    /// The other participant, or `None` if `person` is not part of the event.
    #[inline]
    pub fn partner_of(&self, person: PersonId) -> Option<PersonId> {
        if person == self.person_a {
            Some(self.person_b)
        } else if person == self.person_b {
            Some(self.person_a)
        } else {
            None
        }
    }
}
