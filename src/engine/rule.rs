//! A single directed edge of an event.

use crate::callback::{resolver, Callback, Host};
use crate::core::{State, TransitionContext};
use crate::engine::TransitionError;
use serde_json::Value;
use std::fmt;

/// One (from, to-set) edge with its predicates and callbacks.
///
/// `from == None` matches any current state. Event-level guards are folded
/// into `guards`/`unless` when the rule is registered and never change
/// afterwards.
pub struct TransitionRule<T, S: State> {
    pub(crate) event: String,
    pub(crate) from: Option<S>,
    pub(crate) to: Vec<S>,
    pub(crate) guards: Vec<Callback<T, S>>,
    pub(crate) unless: Vec<Callback<T, S>>,
    pub(crate) after: Option<Callback<T, S>>,
    pub(crate) success: Option<Callback<T, S>>,
}

impl<T, S: State> TransitionRule<T, S> {
    /// Source state, `None` for a wildcard rule.
    pub fn from(&self) -> Option<&S> {
        self.from.as_ref()
    }

    /// Declared destinations in declaration order.
    pub fn to(&self) -> &[S] {
        &self.to
    }

    pub fn is_from(&self, state: &S) -> bool {
        self.from.as_ref() == Some(state)
    }

    pub fn is_wildcard(&self) -> bool {
        self.from.is_none()
    }

    pub fn leads_to(&self, state: &S) -> bool {
        self.to.contains(state)
    }

    pub fn guards(&self) -> &[Callback<T, S>] {
        &self.guards
    }

    pub fn unless_guards(&self) -> &[Callback<T, S>] {
        &self.unless
    }

    /// Whether this rule is a candidate for `current`, optionally
    /// restricted to an explicitly requested target.
    pub fn matches(&self, current: &S, requested: Option<&S>) -> bool {
        let source_ok = self.from.as_ref().is_none_or(|from| from == current);
        let target_ok = requested.is_none_or(|target| self.leads_to(target));
        source_ok && target_ok
    }

    /// Bind the rule to its event and fold the event-level predicates in:
    /// event guards run before the rule's own, event unless predicates
    /// after the rule's own.
    pub(crate) fn attach(
        mut self,
        event: &str,
        guards: &[Callback<T, S>],
        unless: &[Callback<T, S>],
    ) -> Self {
        self.event = event.to_string();
        if !guards.is_empty() {
            let own = std::mem::take(&mut self.guards);
            self.guards = guards.iter().cloned().chain(own).collect();
        }
        self.unless.extend(unless.iter().cloned());
        self
    }

    fn context(&self, current: S) -> TransitionContext<S> {
        TransitionContext::new(
            self.event.clone(),
            self.from.clone().unwrap_or(current),
            self.to.clone(),
        )
    }
}

impl<T: Host<S>, S: State> TransitionRule<T, S> {
    /// Guards (AND, short-circuit) then unless predicates (all falsy).
    pub fn is_allowed(&self, host: &mut T, args: &[Value]) -> Result<bool, TransitionError> {
        let context = self.context(host.current_state());
        Ok(resolver::all(&self.guards, host, &context, args)?
            && resolver::none_of(&self.unless, host, &context, args)?)
    }

    /// Run the inline `after` callback and return its value.
    ///
    /// Without a callback the result is an empty array, the same shape an
    /// empty callback list produces.
    pub fn execute(&self, host: &mut T, args: &[Value]) -> Result<Value, TransitionError> {
        let context = self.context(host.current_state());
        self.run(self.after.as_ref(), host, &context, args)
    }

    /// Run the `success` callback. Only valid once the new state has been
    /// persisted.
    pub fn invoke_success_callbacks(
        &self,
        host: &mut T,
        args: &[Value],
    ) -> Result<Value, TransitionError> {
        let context = self.context(host.current_state());
        self.run(self.success.as_ref(), host, &context, args)
    }

    fn run(
        &self,
        callback: Option<&Callback<T, S>>,
        host: &mut T,
        context: &TransitionContext<S>,
        args: &[Value],
    ) -> Result<Value, TransitionError> {
        match callback {
            Some(callback) => resolver::invoke(callback, host, context, args),
            None => Ok(Value::Array(Vec::new())),
        }
    }
}

impl<T, S: State> PartialEq for TransitionRule<T, S> {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl<T, S: State> Clone for TransitionRule<T, S> {
    fn clone(&self) -> Self {
        Self {
            event: self.event.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            guards: self.guards.clone(),
            unless: self.unless.clone(),
            after: self.after.clone(),
            success: self.success.clone(),
        }
    }
}

impl<T, S: State> fmt::Debug for TransitionRule<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionRule")
            .field("event", &self.event)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("guards", &self.guards)
            .field("unless", &self.unless)
            .finish()
    }
}
