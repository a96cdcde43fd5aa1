//! A host paired with a machine and its transition history.

use crate::core::{State, StateHistory, StateTransition};
use crate::engine::TransitionError;
use crate::machine::registry::{Machine, Outcome, Persist};
use serde_json::Value;

/// One object driven by a shared machine.
///
/// Every persisted transition is appended to the instance's history, also
/// when a callback running after persistence fails.
pub struct Instance<'m, T, S: State> {
    machine: &'m Machine<T, S>,
    host: T,
    history: StateHistory<S>,
}

impl<'m, T: Persist<S>, S: State> Instance<'m, T, S> {
    pub fn new(machine: &'m Machine<T, S>, host: T) -> Self {
        Self {
            machine,
            host,
            history: StateHistory::new(),
        }
    }

    pub fn current_state(&self) -> S {
        self.host.current_state()
    }

    pub fn fire(
        &mut self,
        event: &str,
        requested: Option<Value>,
        args: &[Value],
    ) -> Result<Outcome<S>, TransitionError> {
        let from = self.host.current_state();
        let result = self.machine.fire(&mut self.host, event, requested, args);
        let transition = match &result {
            Ok(outcome) => outcome.transition().cloned(),
            Err(_) => {
                // A callback after `write_state` failed: the state moved anyway.
                let to = self.host.current_state();
                (to != from).then(|| StateTransition::now(event, from, to))
            }
        };
        if let Some(transition) = transition {
            self.history = self.history.record(transition);
        }
        result
    }

    pub fn may_fire(
        &mut self,
        event: &str,
        requested: Option<Value>,
        args: &[Value],
    ) -> Result<Option<S>, TransitionError> {
        self.machine.may_fire(&mut self.host, event, requested, args)
    }

    pub fn permitted_events(&mut self) -> Result<Vec<&'m str>, TransitionError> {
        self.machine.permitted_events(&mut self.host)
    }

    pub fn history(&self) -> &StateHistory<S> {
        &self.history
    }

    pub fn host(&self) -> &T {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut T {
        &mut self.host
    }

    pub fn into_host(self) -> T {
        self.host
    }
}
