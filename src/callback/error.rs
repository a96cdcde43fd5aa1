//! Failure reported by a user callback.

use thiserror::Error;

/// Error returned by a guard or callback body.
///
/// The engine wraps it in `TransitionError::CallbackFailed` together with
/// the callback's label. An event-level `error` callback receives its
/// message as the first argument.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct CallbackError {
    message: String,
}

impl CallbackError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
