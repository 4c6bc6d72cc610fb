//! Activity-type registry: interns activity tags (`"work"`, `"leisure"`, …)
//! into dense [`ActivityType`] indices.
//!
//! The registration order is significant: it fixes the column order of every
//! per-activity output.

use std::collections::HashMap;

use crate::{ActivityType, EpError, EpResult};

#[derive(Clone, Debug, Default)]
pub struct ActivityRegistry {
    names: Vec<String>,
    index: HashMap<String, ActivityType>,
}

impl ActivityRegistry {
    /// Build from an ordered list of tags.  Empty or duplicate tags are a
    /// configuration error.
    pub fn new<S: AsRef<str>>(names: &[S]) -> EpResult<Self> {
        let mut reg = Self::default();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(EpError::Config("empty activity type name".into()));
            }
            if reg.index.contains_key(name) {
                return Err(EpError::Config(format!("duplicate activity type {name:?}")));
            }
            let id = ActivityType(u16::try_from(reg.names.len()).map_err(|_| {
                EpError::Config("more than 65,535 activity types".into())
            })?);
            reg.index.insert(name.to_owned(), id);
            reg.names.push(name.to_owned());
        }
        Ok(reg)
    }

    /// Look up a tag.
    #[inline]
    pub fn resolve(&self, name: &str) -> Option<ActivityType> {
        self.index.get(name).copied()
    }

    /// Look up a tag, failing with a configuration error naming `context`.
    pub fn require(&self, name: &str, context: &str) -> EpResult<ActivityType> {
        self.resolve(name)
            .ok_or_else(|| EpError::UnknownActivity { name: name.to_owned(), context: context.to_owned() })
    }

    /// The tag of `activity`.
    ///
    /// # Panics
    /// Panics if `activity` was not produced by this registry.
    pub fn name(&self, activity: ActivityType) -> &str {
        &self.names[activity.index()]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All activity types in registration order.
    pub fn types(&self) -> impl Iterator<Item = ActivityType> + '_ {
        (0..self.names.len() as u16).map(ActivityType)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}
