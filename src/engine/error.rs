//! Errors raised while selecting or executing a transition.

use crate::callback::CallbackError;
use thiserror::Error;

/// Errors that can occur while firing an event.
///
/// "No rule won" is not an error at the engine level: `Event::fire` and
/// `Event::may_fire` report it as `Ok(None)`. The runtime turns it into
/// `InvalidTransition` only in strict mode.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransitionError {
    #[error("Event '{0}' is not defined")]
    UnknownEvent(String),

    #[error("Event '{event}' cannot transition from '{from}'")]
    InvalidTransition { event: String, from: String },

    #[error("undefined callback `{name}' for {object}")]
    MissingCallback { name: String, object: String },

    #[error("Callback `{callback}' failed: {source}")]
    CallbackFailed {
        callback: String,
        #[source]
        source: CallbackError,
    },

    #[error("Event '{event}' could not persist state '{state}'")]
    PersistenceFailed { event: String, state: String },
}

impl TransitionError {
    /// Whether an event-level `error` callback may handle this error.
    ///
    /// Only failures raised by callback bodies qualify; configuration
    /// defects and selection outcomes always propagate.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::CallbackFailed { .. })
    }
}
