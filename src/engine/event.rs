//! Named events: transition selection and the firing protocol.

use crate::callback::{resolver, Callback, Host};
use crate::core::{State, TransitionContext};
use crate::engine::rule::TransitionRule;
use crate::engine::TransitionError;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// Event-scoped callback slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallbackSlot {
    /// Before selection runs.
    Before,
    /// After the new state has been persisted and success callbacks ran.
    After,
    /// Handles callback failures; its value becomes the fire result.
    Error,
    /// After the new state has been persisted.
    Success,
    /// After `After`, once the runtime considers the change committed.
    AfterCommit,
    /// Always last, whatever the outcome.
    Ensure,
}

impl CallbackSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
            Self::Error => "error",
            Self::Success => "success",
            Self::AfterCommit => "after_commit",
            Self::Ensure => "ensure",
        }
    }
}

/// Options for a real firing.
#[derive(Clone, Debug, PartialEq)]
pub struct FireOptions<S: State> {
    reachable: Option<S>,
}

impl<S: State> FireOptions<S> {
    pub fn new() -> Self {
        Self { reachable: None }
    }

    /// Skip guard evaluation: any candidate whose destinations include
    /// `state` is allowed. Used after a `may_fire` probe already evaluated
    /// the guards, so they run once per firing.
    pub fn reachable(state: S) -> Self {
        Self {
            reachable: Some(state),
        }
    }
}

impl<S: State> Default for FireOptions<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a real firing that selected a winner.
#[derive(Clone, Debug, PartialEq)]
pub struct Fired<S: State> {
    /// Index of the winning rule in `Event::transitions`.
    pub rule: usize,
    /// Resolved target state.
    pub target: S,
    /// Value returned by the winning rule's `after` callback.
    pub value: Value,
    /// Call arguments after target disambiguation.
    pub args: Vec<Value>,
}

enum Requested<S> {
    Untyped(Option<Value>),
    Typed(S),
}

struct Selection<S> {
    index: usize,
    target: S,
    args: Vec<Value>,
}

/// A named collection of transition rules plus event-scoped callbacks.
///
/// Events are immutable once built, except for the ledger that remembers
/// which rule produced each target state so success callbacks run for the
/// edge that was actually taken.
pub struct Event<T, S: State> {
    name: String,
    transitions: Vec<TransitionRule<T, S>>,
    guards: Vec<Callback<T, S>>,
    unless: Vec<Callback<T, S>>,
    callbacks: HashMap<CallbackSlot, Callback<T, S>>,
    fired: Mutex<Vec<(S, usize)>>,
}

impl<T, S: State> Event<T, S> {
    pub(crate) fn new(
        name: String,
        transitions: Vec<TransitionRule<T, S>>,
        guards: Vec<Callback<T, S>>,
        unless: Vec<Callback<T, S>>,
        callbacks: HashMap<CallbackSlot, Callback<T, S>>,
    ) -> Self {
        Self {
            name,
            transitions,
            guards,
            unless,
            callbacks,
            fired: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rules in declaration order.
    pub fn transitions(&self) -> &[TransitionRule<T, S>] {
        &self.transitions
    }

    /// Event-level guards as they stood when the event was built.
    pub fn guards(&self) -> &[Callback<T, S>] {
        &self.guards
    }

    pub fn unless_guards(&self) -> &[Callback<T, S>] {
        &self.unless
    }

    pub fn callback(&self, slot: CallbackSlot) -> Option<&Callback<T, S>> {
        self.callbacks.get(&slot)
    }

    /// Rules that can start from `state`, wildcard rules included.
    pub fn transitions_from_state(&self, state: &S) -> Vec<&TransitionRule<T, S>> {
        self.transitions
            .iter()
            .filter(|rule| rule.matches(state, None))
            .collect()
    }

    pub fn transitions_from_state_exists(&self, state: &S) -> bool {
        self.transitions.iter().any(|rule| rule.matches(state, None))
    }

    /// Rules that declare `state` among their destinations.
    pub fn transitions_to_state(&self, state: &S) -> Vec<&TransitionRule<T, S>> {
        self.transitions
            .iter()
            .filter(|rule| rule.leads_to(state))
            .collect()
    }

    pub fn transitions_to_state_exists(&self, state: &S) -> bool {
        self.transitions.iter().any(|rule| rule.leads_to(state))
    }

    /// Split a positional value into a target state or a call argument,
    /// checking against every rule of the event.
    ///
    /// This is what event-scoped callbacks see; selection repeats the
    /// check against its own candidates.
    pub fn split_target(&self, requested: Option<Value>, args: &[Value]) -> (Option<S>, Vec<Value>) {
        let all: Vec<usize> = (0..self.transitions.len()).collect();
        self.classify(&all, requested, args)
    }

    fn classify(
        &self,
        candidates: &[usize],
        requested: Option<Value>,
        args: &[Value],
    ) -> (Option<S>, Vec<Value>) {
        let mut args = args.to_vec();
        let requested = match requested {
            None | Some(Value::Null) => return (None, args),
            Some(value) => value,
        };
        match serde_json::from_value::<S>(requested.clone()) {
            Ok(state)
                if candidates
                    .iter()
                    .any(|&index| self.transitions[index].leads_to(&state)) =>
            {
                (Some(state), args)
            }
            _ => {
                args.insert(0, requested);
                (None, args)
            }
        }
    }

    /// Indices of the rules eligible from `current`.
    ///
    /// Once any rule names a concrete source, only rules from `current`
    /// qualify and wildcard rules are ignored. An event made only of
    /// wildcard rules offers all of them.
    fn candidates(&self, current: &S) -> Vec<usize> {
        let concrete = self.transitions.iter().any(|rule| !rule.is_wildcard());
        self.transitions
            .iter()
            .enumerate()
            .filter(|(_, rule)| if concrete { rule.is_from(current) } else { true })
            .map(|(index, _)| index)
            .collect()
    }

    fn ledger(&self) -> MutexGuard<'_, Vec<(S, usize)>> {
        self.fired.lock().unwrap_or_else(|poisoned| {
            warn!(event = %self.name, "fired-rule ledger was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn record_fired(&self, target: &S, index: usize) {
        let mut ledger = self.ledger();
        match ledger.iter_mut().find(|(state, _)| state == target) {
            Some(entry) => entry.1 = index,
            None => ledger.push((target.clone(), index)),
        }
    }

    fn fired_rule(&self, state: &S) -> Option<&TransitionRule<T, S>> {
        let index = self
            .ledger()
            .iter()
            .find(|(recorded, _)| recorded == state)
            .map(|(_, index)| *index)?;
        self.transitions.get(index)
    }
}

impl<T: Host<S>, S: State> Event<T, S> {
    /// Probe whether the event could fire, without running `after`,
    /// persistence or success callbacks.
    ///
    /// Returns the state a real firing would resolve to, or `None`.
    /// Guards do run, with the same selection as `fire`.
    pub fn may_fire(
        &self,
        host: &mut T,
        requested: Option<Value>,
        args: &[Value],
    ) -> Result<Option<S>, TransitionError> {
        let selection = self.select(
            host,
            &FireOptions::default(),
            Requested::Untyped(requested),
            args,
        )?;
        Ok(selection.map(|selection| selection.target))
    }

    /// Probe for an explicit, typed target.
    pub fn may_fire_to(
        &self,
        host: &mut T,
        target: S,
        args: &[Value],
    ) -> Result<Option<S>, TransitionError> {
        let selection = self.select(host, &FireOptions::default(), Requested::Typed(target), args)?;
        Ok(selection.map(|selection| selection.target))
    }

    /// Select a rule and execute it.
    ///
    /// `requested` is either a target state or, when it is not a
    /// destination of any candidate, the first call argument. `Ok(None)`
    /// means no rule won; nothing was executed.
    pub fn fire(
        &self,
        host: &mut T,
        options: &FireOptions<S>,
        requested: Option<Value>,
        args: &[Value],
    ) -> Result<Option<Fired<S>>, TransitionError> {
        let selection = self.select(host, options, Requested::Untyped(requested), args)?;
        self.execute(host, selection)
    }

    /// Fire towards an explicit, typed target. Rules that do not lead to
    /// `target` are skipped.
    pub fn fire_to(
        &self,
        host: &mut T,
        options: &FireOptions<S>,
        target: S,
        args: &[Value],
    ) -> Result<Option<Fired<S>>, TransitionError> {
        let selection = self.select(host, options, Requested::Typed(target), args)?;
        self.execute(host, selection)
    }

    /// Invoke the event-level callback in `slot`.
    ///
    /// Returns `None` when the slot is empty.
    pub fn fire_callbacks(
        &self,
        slot: CallbackSlot,
        host: &mut T,
        args: &[Value],
    ) -> Result<Option<Value>, TransitionError> {
        let context = TransitionContext::for_event(self.name.clone(), host.current_state());
        self.fire_callbacks_with(slot, host, &context, args)
    }

    pub(crate) fn fire_callbacks_with(
        &self,
        slot: CallbackSlot,
        host: &mut T,
        context: &TransitionContext<S>,
        args: &[Value],
    ) -> Result<Option<Value>, TransitionError> {
        match self.callbacks.get(&slot) {
            Some(callback) => resolver::invoke(callback, host, context, args).map(Some),
            None => Ok(None),
        }
    }

    /// Invoke the `error` slot for `error`, whose message is prepended to
    /// the call arguments.
    pub fn fire_error_callbacks(
        &self,
        host: &mut T,
        error: &TransitionError,
        args: &[Value],
    ) -> Result<Option<Value>, TransitionError> {
        let message = match error {
            TransitionError::CallbackFailed { source, .. } => source.message().to_string(),
            other => other.to_string(),
        };
        let mut error_args = Vec::with_capacity(args.len() + 1);
        error_args.push(Value::String(message));
        error_args.extend_from_slice(args);
        self.fire_callbacks(CallbackSlot::Error, host, &error_args)
    }

    /// Run the success callbacks of the rule that last produced the host's
    /// current state.
    ///
    /// Returns `None` when this event never fired into that state. The
    /// lookup goes through a ledger shared by every host firing this event;
    /// when firings on different hosts overlap, use
    /// `fire_success_callbacks` with the `Fired` of the firing instead.
    pub fn fire_transition_success_callbacks(
        &self,
        host: &mut T,
        args: &[Value],
    ) -> Result<Option<Value>, TransitionError> {
        let current = host.current_state();
        match self.fired_rule(&current) {
            Some(rule) => rule.invoke_success_callbacks(host, args).map(Some),
            None => Ok(None),
        }
    }

    /// Run the success callbacks of the rule that produced `fired`.
    pub fn fire_success_callbacks(
        &self,
        host: &mut T,
        fired: &Fired<S>,
    ) -> Result<Option<Value>, TransitionError> {
        match self.transitions.get(fired.rule) {
            Some(rule) => rule.invoke_success_callbacks(host, &fired.args).map(Some),
            None => Ok(None),
        }
    }

    fn select(
        &self,
        host: &mut T,
        options: &FireOptions<S>,
        requested: Requested<S>,
        args: &[Value],
    ) -> Result<Option<Selection<S>>, TransitionError> {
        let current = host.current_state();
        let candidates = self.candidates(&current);

        if candidates.is_empty() {
            debug!(event = %self.name, from = current.name(), "no rule starts from current state");
            return Ok(None);
        }

        let (requested, args) = match requested {
            Requested::Untyped(value) => self.classify(&candidates, value, args),
            Requested::Typed(state) => (Some(state), args.to_vec()),
        };

        for index in candidates {
            let rule = &self.transitions[index];
            if requested.as_ref().is_some_and(|target| !rule.leads_to(target)) {
                continue;
            }
            let allowed = match &options.reachable {
                Some(probe) => rule.leads_to(probe),
                None => rule.is_allowed(host, &args)?,
            };
            if !allowed {
                continue;
            }
            let Some(target) = requested.clone().or_else(|| rule.to.first().cloned()) else {
                continue;
            };
            debug!(
                event = %self.name,
                from = current.name(),
                to = target.name(),
                rule = index,
                "transition selected"
            );
            return Ok(Some(Selection {
                index,
                target,
                args,
            }));
        }

        debug!(event = %self.name, from = current.name(), "no rule allowed");
        Ok(None)
    }

    fn execute(
        &self,
        host: &mut T,
        selection: Option<Selection<S>>,
    ) -> Result<Option<Fired<S>>, TransitionError> {
        let Some(selection) = selection else {
            return Ok(None);
        };
        self.record_fired(&selection.target, selection.index);
        let value = self.transitions[selection.index].execute(host, &selection.args)?;
        Ok(Some(Fired {
            rule: selection.index,
            target: selection.target,
            value,
            args: selection.args,
        }))
    }
}

impl<T, S: State> fmt::Debug for Event<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("transitions", &self.transitions)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}
