//! Registration errors for rules, events and machines.

use thiserror::Error;

/// Errors raised while building rules, events and machines.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("No events defined. Add at least one event")]
    NoEvents,

    #[error("Event '{event}' has no transitions. Add at least one with .transition(rule)")]
    NoTransitions { event: String },

    #[error("Event '{event}' is defined more than once")]
    DuplicateEvent { event: String },

    #[error("Transition source state not specified. Call .from(state) or .from_any()")]
    MissingFromState,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingToState,

    #[error("Transition declares {count} source states. Register it on an event to get one rule per source")]
    AmbiguousFromState { count: usize },

    #[error("{} problems: {}", .0.len(), summarize(.0))]
    Invalid(Vec<BuildError>),
}

fn summarize(problems: &[BuildError]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
