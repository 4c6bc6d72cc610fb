//! `ep-policy` — time-varying activity restrictions.
//!
//! | Module     | Contents                                                     |
//! |------------|--------------------------------------------------------------|
//! | [`policy`] | `Policy` trait, `NoRestrictions`, `FixedPolicy`, `Combined`  |
//! | [`engine`] | `PolicyEngine` (seeded per-event admission)                  |
//! | [`error`]  | `PolicyError`, `PolicyResult<T>`                             |

pub mod engine;
pub mod error;
pub mod policy;


pub use engine::PolicyEngine;
pub use error::{PolicyError, PolicyResult};
pub use policy::{Combined, FixedPolicy, NoRestrictions, Policy, PolicyExt};
