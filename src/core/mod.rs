//! Core types shared by the engine and the runtime.
//!
//! - States via the `State` trait
//! - The `TransitionContext` handed to every guard and callback
//! - Immutable history of persisted transitions
//! - Truthiness of dynamically typed callback results

mod context;
mod history;
mod state;
mod value;

pub use context::TransitionContext;
pub use history::{StateHistory, StateTransition};
pub use state::State;
pub use value::truthy;
