//! Fireflow: an event/transition firing engine.
//!
//! Given a registry of named events, each holding ordered
//! (from-state → to-states) rules guarded by predicates, Fireflow decides
//! at call time which single rule fires for an object in its current
//! state, runs the guard and callback chain in a fixed order, and reports
//! the outcome. Persistence stays with the caller.
//!
//! # Core Concepts
//!
//! - **State**: any value implementing `State` (see `state_enum!`)
//! - **Host**: the object an event fires on; exposes its current state and
//!   its named callbacks
//! - **Callback**: a named reference, an inline function, or a list of
//!   either, dispatched with arguments trimmed to the callee's arity
//! - **Event**: ordered rules, first match wins; `may_fire` probes with the
//!   same selection as `fire`
//! - **Machine**: the runtime around events: persistence, strict or silent
//!   failure, success/after callbacks and error recovery
//!
//! # Example
//!
//! ```rust
//! use fireflow::builder::{EventBuilder, MachineBuilder, RuleBuilder};
//! use fireflow::callback::{CallbackError, Host, Method};
//! use fireflow::machine::{Instance, Persist};
//! use fireflow::state_enum;
//!
//! state_enum! {
//!     enum Door { Open, Closed }
//! }
//!
//! struct Frame { state: Door, latch_ok: bool }
//!
//! impl Host<Door> for Frame {
//!     fn current_state(&self) -> Door { self.state.clone() }
//!     fn method(&self, _name: &str) -> Option<Method<Self, Door>> { None }
//! }
//!
//! impl Persist<Door> for Frame {
//!     fn write_state(&mut self, state: &Door) -> Result<bool, CallbackError> {
//!         self.state = state.clone();
//!         Ok(true)
//!     }
//! }
//!
//! let machine = MachineBuilder::new()
//!     .initial(Door::Open)
//!     .event(
//!         EventBuilder::new("close")
//!             .transition(
//!                 RuleBuilder::new()
//!                     .from(Door::Open)
//!                     .to(Door::Closed)
//!                     .when(|frame: &Frame| frame.latch_ok),
//!             )
//!             .unwrap(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let mut door = Instance::new(&machine, Frame { state: Door::Open, latch_ok: true });
//! assert!(door.fire("close", None, &[]).unwrap().is_transitioned());
//! assert_eq!(door.current_state(), Door::Closed);
//! assert_eq!(door.history().transitions().len(), 1);
//! ```

pub mod builder;
pub mod callback;
pub mod core;
pub mod engine;
pub mod machine;

// Re-export commonly used types
pub use callback::{Arity, Callback, CallbackError, Host, Method};
pub use core::{State, StateHistory, StateTransition, TransitionContext};
pub use engine::{CallbackSlot, Event, FireOptions, Fired, TransitionError, TransitionRule};
pub use machine::{Machine, MachineConfig, Outcome, Persist};
