//! Per-instance record of persisted transitions.
//!
//! The engine itself keeps no per-object state. A runtime that wants an
//! audit trail records one `StateTransition` per persisted firing.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One persisted transition.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state before the event fired
    pub from: S,
    /// The state the event resolved to
    pub to: S,
    /// Name of the event that produced the transition
    pub event: String,
    /// When the new state was persisted
    pub timestamp: DateTime<Utc>,
}

impl<S: State> StateTransition<S> {
    /// Record stamped with the current time.
    pub fn now(event: impl Into<String>, from: S, to: S) -> Self {
        Self {
            from,
            to,
            event: event.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Ordered, immutable history of transitions.
///
/// `record` returns a new history and leaves the receiver untouched.
///
/// # Example
///
/// ```rust
/// use fireflow::core::{State, StateHistory, StateTransition};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Ticket { Open, Triaged, Closed }
///
/// impl State for Ticket {
///     fn name(&self) -> &str {
///         match self {
///             Self::Open => "Open",
///             Self::Triaged => "Triaged",
///             Self::Closed => "Closed",
///         }
///     }
/// }
///
/// let history = StateHistory::new()
///     .record(StateTransition::now("triage", Ticket::Open, Ticket::Triaged))
///     .record(StateTransition::now("close", Ticket::Triaged, Ticket::Closed));
///
/// assert_eq!(
///     history.get_path(),
///     vec![&Ticket::Open, &Ticket::Triaged, &Ticket::Closed]
/// );
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<StateTransition<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Return a new history with `transition` appended.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// States traversed: the first source followed by every destination.
    pub fn get_path(&self) -> Vec<&S> {
        self.transitions
            .first()
            .map(|first| &first.from)
            .into_iter()
            .chain(self.transitions.iter().map(|transition| &transition.to))
            .collect()
    }

    /// Time between the first and last recorded transition.
    ///
    /// Returns `None` for an empty history.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.transitions.first()?;
        let last = self.transitions.last()?;
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// Most recent transition.
    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.last()
    }

    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }
}
