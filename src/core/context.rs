//! The in-flight transition context handed to guards and callbacks.

use crate::core::State;

/// Describes the edge being evaluated or executed.
///
/// The engine builds one of these before every guard and callback
/// invocation and passes it by reference, so a callback can read the
/// previous and next state without touching shared mutable fields on the
/// host object.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionContext<S: State> {
    /// Name of the event being fired.
    pub event: String,
    /// Source state of the edge. For wildcard rules this is the host's
    /// current state at the time of the call.
    pub from: S,
    /// Declared destinations of the edge, in declaration order. Empty for
    /// event-level callbacks that run before a rule is selected.
    pub to: Vec<S>,
}

impl<S: State> TransitionContext<S> {
    pub fn new(event: impl Into<String>, from: S, to: Vec<S>) -> Self {
        Self {
            event: event.into(),
            from,
            to,
        }
    }

    /// Context for event-scoped callbacks where no rule is bound yet.
    pub fn for_event(event: impl Into<String>, from: S) -> Self {
        Self::new(event, from, Vec::new())
    }

    /// First declared destination, if any.
    pub fn target(&self) -> Option<&S> {
        self.to.first()
    }
}
