//! Callback declarations and their dispatch.
//!
//! A declaration is a named reference, an inline function, or an ordered
//! list of either. Every invocable carries an `Arity`, and arguments are
//! trimmed to it at the moment of the call regardless of how the
//! declaration was written.

mod declaration;
mod error;
mod host;
pub mod resolver;

pub use declaration::{Arity, Callback, Method, MethodFn};
pub use error::CallbackError;
pub use host::{Host, MethodTable};
