//! Registration API for rules, events and machines.
//!
//! Builders validate eagerly: a rule must name its source (`from` or
//! `from_any`) and at least one destination, an event needs at least one
//! rule, and a machine needs an initial state and uniquely named events.

pub mod error;
pub mod event;
pub mod machine;
pub mod macros;
pub mod rule;

pub use error::BuildError;
pub use event::EventBuilder;
pub use machine::MachineBuilder;
pub use rule::RuleBuilder;
