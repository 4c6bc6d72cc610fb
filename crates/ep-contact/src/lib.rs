//! `ep-contact` — who infects whom on a given day.
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`model`]       | `InfectionModel` trait, `ViralLoadModel`, `infection_probability` |
//! | [`corrections`] | `ActivityCorrections` step functions                      |
//! | [`evaluate`]    | `ContactModel`, `Candidate`, `Infection`                  |
//! | [`error`]       | `ContactError`, `ContactResult<T>`                        |
//!
//! # Determinism
//!
//! Every random decision is a keyed draw ([`ep_core::KeyedRng`]) addressed by
//! day and person, never a shared stream consumed in arrival order.  Combined
//! with the canonical candidate sort, the infections of a day depend only on
//! the seed and the admitted events, not on worker count or scheduling.

pub mod corrections;
pub mod error;
pub mod evaluate;
pub mod model;

#[cfg(test)]
mod tests;

pub use corrections::ActivityCorrections;
pub use error::{ContactError, ContactResult};
pub use evaluate::{Candidate, ContactModel, Infection};
pub use model::{infection_probability, InfectionModel, ViralLoadModel};
