//! `ep-events` — the day-scoped contact-event stream.
//!
//! | Module     | Contents                                                 |
//! |------------|----------------------------------------------------------|
//! | [`event`]  | `ContactEvent`                                           |
//! | [`replay`] | `EventReplay` trait, `ReplayMode`, `CsvEventReplay`      |
//! | [`memory`] | `MemoryReplay`                                           |
//! | [`error`]  | `MalformedRecordError`, `EventError`, `EventResult<T>`   |

pub mod error;
pub mod event;
pub mod memory;
pub mod replay;


pub use error::{EventError, EventResult, MalformedRecordError};
pub use event::ContactEvent;
pub use memory::MemoryReplay;
pub use replay::{CsvEventReplay, DayEvents, EventReplay, ReplayMode};
