//! The runtime that drives a full firing around the engine.

use crate::callback::{CallbackError, Host};
use crate::core::{State, StateTransition, TransitionContext};
use crate::engine::{CallbackSlot, Event, FireOptions, TransitionError};
use crate::machine::config::MachineConfig;
use serde_json::Value;
use std::fmt;
use tracing::{debug, info, warn};

/// Persistence contract of a host the runtime fires on.
///
/// `write_state` is the only hook that changes the host's state. Returning
/// `Ok(false)` means the write was rejected: no success or after callbacks
/// run.
pub trait Persist<S: State>: Host<S> {
    fn write_state(&mut self, state: &S) -> Result<bool, CallbackError>;

    /// Called after a transition was persisted.
    fn on_fired(&mut self, _event: &str, _from: &S, _to: &S) {}

    /// Called when no rule of the event won.
    fn on_failed(&mut self, _event: &str, _from: &S) {}
}

/// Result of `Machine::fire`.
#[derive(Clone, Debug)]
pub enum Outcome<S: State> {
    /// The new state was persisted.
    Transitioned {
        transition: StateTransition<S>,
        /// Value of the winning rule's `after` callback.
        value: Value,
    },
    /// No rule won and the machine is not in strict mode.
    Failed { from: S },
    /// A rule won but the host rejected the state write.
    NotPersisted { target: S },
    /// A callback failed and the event's `error` callback handled it.
    ///
    /// `transition` is set when the new state had already been persisted
    /// before the failure.
    Recovered {
        value: Value,
        transition: Option<StateTransition<S>>,
    },
}

impl<S: State> Outcome<S> {
    pub fn is_transitioned(&self) -> bool {
        matches!(self, Self::Transitioned { .. })
    }

    /// The persisted transition, if the firing got that far.
    pub fn transition(&self) -> Option<&StateTransition<S>> {
        match self {
            Self::Transitioned { transition, .. } => Some(transition),
            Self::Recovered { transition, .. } => transition.as_ref(),
            _ => None,
        }
    }
}

/// Immutable registry of events plus the runtime policy.
///
/// A machine can be shared between any number of hosts, including hosts
/// firing on different threads. `fire` binds success callbacks to the rule
/// recorded in its own `Fired`, never to the event's shared ledger.
pub struct Machine<T, S: State> {
    initial: S,
    events: Vec<Event<T, S>>,
    config: MachineConfig,
}

impl<T, S: State> Machine<T, S> {
    pub(crate) fn new(initial: S, events: Vec<Event<T, S>>, config: MachineConfig) -> Self {
        Self {
            initial,
            events,
            config,
        }
    }

    pub fn initial_state(&self) -> &S {
        &self.initial
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn events(&self) -> &[Event<T, S>] {
        &self.events
    }

    pub fn event(&self, name: &str) -> Option<&Event<T, S>> {
        self.events.iter().find(|event| event.name() == name)
    }

    /// Names of events with at least one rule starting from `state`.
    pub fn events_from(&self, state: &S) -> Vec<&str> {
        self.events
            .iter()
            .filter(|event| event.transitions_from_state_exists(state))
            .map(Event::name)
            .collect()
    }

    fn lookup(&self, name: &str) -> Result<&Event<T, S>, TransitionError> {
        self.event(name)
            .ok_or_else(|| TransitionError::UnknownEvent(name.to_string()))
    }
}

impl<T: Host<S>, S: State> Machine<T, S> {
    /// Probe an event by name. See `Event::may_fire`.
    pub fn may_fire(
        &self,
        host: &mut T,
        event: &str,
        requested: Option<Value>,
        args: &[Value],
    ) -> Result<Option<S>, TransitionError> {
        self.lookup(event)?.may_fire(host, requested, args)
    }

    /// Names of events that could fire for the host right now, guards
    /// included.
    pub fn permitted_events(&self, host: &mut T) -> Result<Vec<&str>, TransitionError> {
        let current = host.current_state();
        let mut permitted = Vec::new();
        for event in &self.events {
            if !event.transitions_from_state_exists(&current) {
                continue;
            }
            if event.may_fire(host, None, &[])?.is_some() {
                permitted.push(event.name());
            }
        }
        Ok(permitted)
    }
}

impl<T: Persist<S>, S: State> Machine<T, S> {
    /// Fire `event` for `host` and persist the result.
    ///
    /// Order: event `before`, selection and the winning rule's `after`,
    /// `write_state`, the rule's success callbacks, event `success`,
    /// `on_fired`, event `after`, event `after_commit`. Event `ensure`
    /// runs last whatever happened. A callback failure is handed to the
    /// event's `error` callback when one is configured.
    pub fn fire(
        &self,
        host: &mut T,
        event: &str,
        requested: Option<Value>,
        args: &[Value],
    ) -> Result<Outcome<S>, TransitionError> {
        let event = self.lookup(event)?;
        let from = host.current_state();
        let (_, callback_args) = event.split_target(requested.clone(), args);

        let mut persisted = None;
        let result = match self.run(
            event,
            host,
            &from,
            requested,
            args,
            &callback_args,
            &mut persisted,
        ) {
            Err(err) if err.is_recoverable() && event.callback(CallbackSlot::Error).is_some() => {
                warn!(event = event.name(), error = %err, "callback failed, running error callback");
                event
                    .fire_error_callbacks(host, &err, &callback_args)
                    .map(|value| Outcome::Recovered {
                        value: value.unwrap_or(Value::Null),
                        transition: persisted,
                    })
            }
            other => other,
        };

        let ensured = event.fire_callbacks(CallbackSlot::Ensure, host, &callback_args);
        match (result, ensured) {
            (Err(err), _) | (Ok(_), Err(err)) => Err(err),
            (Ok(outcome), Ok(_)) => Ok(outcome),
        }
    }

    fn run(
        &self,
        event: &Event<T, S>,
        host: &mut T,
        from: &S,
        requested: Option<Value>,
        args: &[Value],
        callback_args: &[Value],
        persisted: &mut Option<StateTransition<S>>,
    ) -> Result<Outcome<S>, TransitionError> {
        let context = TransitionContext::for_event(event.name(), from.clone());
        event.fire_callbacks_with(CallbackSlot::Before, host, &context, callback_args)?;

        let Some(fired) = event.fire(host, &FireOptions::default(), requested, args)? else {
            return self.failed(event, host, from);
        };

        let written = host
            .write_state(&fired.target)
            .map_err(|source| TransitionError::CallbackFailed {
                callback: "write_state".to_string(),
                source,
            })?;
        if !written {
            warn!(event = event.name(), to = fired.target.name(), "state write rejected");
            if self.config.whiny_persistence {
                return Err(TransitionError::PersistenceFailed {
                    event: event.name().to_string(),
                    state: fired.target.name().to_string(),
                });
            }
            return Ok(Outcome::NotPersisted {
                target: fired.target,
            });
        }
        info!(
            event = event.name(),
            from = from.name(),
            to = fired.target.name(),
            "transition persisted"
        );

        let transition = StateTransition::now(event.name(), from.clone(), fired.target.clone());
        *persisted = Some(transition.clone());

        event.fire_success_callbacks(host, &fired)?;
        let context =
            TransitionContext::new(event.name(), from.clone(), vec![fired.target.clone()]);
        event.fire_callbacks_with(CallbackSlot::Success, host, &context, callback_args)?;
        host.on_fired(event.name(), from, &fired.target);
        event.fire_callbacks_with(CallbackSlot::After, host, &context, callback_args)?;
        event.fire_callbacks_with(CallbackSlot::AfterCommit, host, &context, callback_args)?;

        Ok(Outcome::Transitioned {
            transition,
            value: fired.value,
        })
    }

    fn failed(
        &self,
        event: &Event<T, S>,
        host: &mut T,
        from: &S,
    ) -> Result<Outcome<S>, TransitionError> {
        host.on_failed(event.name(), from);
        debug!(event = event.name(), from = from.name(), "event did not fire");
        if self.config.whiny_transitions {
            return Err(TransitionError::InvalidTransition {
                event: event.name().to_string(),
                from: from.name().to_string(),
            });
        }
        Ok(Outcome::Failed { from: from.clone() })
    }
}

impl<T, S: State> fmt::Debug for Machine<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("initial", &self.initial)
            .field("events", &self.events)
            .field("config", &self.config)
            .finish()
    }
}
