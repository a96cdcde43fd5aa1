//! The transition firing engine.
//!
//! An `Event` filters its rules by the host's current state, resolves an
//! optional requested target, and picks the first rule (in declaration
//! order) whose guards pass. `may_fire` stops there; `fire` also records
//! which rule produced the target and runs that rule's `after` callback.
//! The engine never writes state: persistence belongs to the caller.

mod error;
mod event;
mod rule;

pub use error::TransitionError;
pub use event::{CallbackSlot, Event, FireOptions, Fired};
pub use rule::TransitionRule;
