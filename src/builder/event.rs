//! Builder for events.

use crate::builder::error::BuildError;
use crate::builder::rule::RuleBuilder;
use crate::callback::Callback;
use crate::core::State;
use crate::engine::{CallbackSlot, Event, TransitionRule};
use std::collections::HashMap;

/// Fluent builder for an event.
///
/// Event-level guards and unless predicates are folded into each rule at
/// the moment the rule is registered. Predicates added after a rule was
/// registered do not reach it.
///
/// ```rust
/// use fireflow::builder::{EventBuilder, RuleBuilder};
/// use fireflow::callback::{Host, Method};
/// use fireflow::state_enum;
///
/// state_enum! {
///     enum Door { Open, Closed }
/// }
///
/// struct Frame { state: Door }
///
/// impl Host<Door> for Frame {
///     fn current_state(&self) -> Door { self.state.clone() }
///     fn method(&self, _name: &str) -> Option<Method<Self, Door>> { None }
/// }
///
/// let close = EventBuilder::<Frame, Door>::new("close")
///     .transition(RuleBuilder::new().from(Door::Open).to(Door::Closed))
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let mut frame = Frame { state: Door::Open };
/// assert_eq!(close.may_fire(&mut frame, None, &[]).unwrap(), Some(Door::Closed));
/// ```
pub struct EventBuilder<T, S: State> {
    name: String,
    transitions: Vec<TransitionRule<T, S>>,
    guards: Vec<Callback<T, S>>,
    unless: Vec<Callback<T, S>>,
    callbacks: HashMap<CallbackSlot, Vec<Callback<T, S>>>,
}

impl<T, S: State> EventBuilder<T, S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transitions: Vec::new(),
            guards: Vec::new(),
            unless: Vec::new(),
            callbacks: HashMap::new(),
        }
    }

    /// Guard folded into every rule registered from now on.
    pub fn guard(mut self, guard: impl Into<Callback<T, S>>) -> Self {
        self.guards.push(guard.into());
        self
    }

    /// Unless predicate folded into every rule registered from now on.
    pub fn unless(mut self, predicate: impl Into<Callback<T, S>>) -> Self {
        self.unless.push(predicate.into());
        self
    }

    /// Add a callback to `slot`. Several callbacks in one slot run in
    /// registration order.
    pub fn callback(mut self, slot: CallbackSlot, callback: impl Into<Callback<T, S>>) -> Self {
        self.callbacks.entry(slot).or_default().push(callback.into());
        self
    }

    pub fn before(self, callback: impl Into<Callback<T, S>>) -> Self {
        self.callback(CallbackSlot::Before, callback)
    }

    pub fn after(self, callback: impl Into<Callback<T, S>>) -> Self {
        self.callback(CallbackSlot::After, callback)
    }

    pub fn error(self, callback: impl Into<Callback<T, S>>) -> Self {
        self.callback(CallbackSlot::Error, callback)
    }

    pub fn success(self, callback: impl Into<Callback<T, S>>) -> Self {
        self.callback(CallbackSlot::Success, callback)
    }

    pub fn after_commit(self, callback: impl Into<Callback<T, S>>) -> Self {
        self.callback(CallbackSlot::AfterCommit, callback)
    }

    pub fn ensure(self, callback: impl Into<Callback<T, S>>) -> Self {
        self.callback(CallbackSlot::Ensure, callback)
    }

    /// Register the rules described by `builder`, one per source state.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: RuleBuilder<T, S>) -> Result<Self, BuildError> {
        for rule in builder.expand()? {
            self.transitions
                .push(rule.attach(&self.name, &self.guards, &self.unless));
        }
        Ok(self)
    }

    /// Register a pre-built rule.
    pub fn add_transition(mut self, rule: TransitionRule<T, S>) -> Self {
        let rule = rule.attach(&self.name, &self.guards, &self.unless);
        self.transitions.push(rule);
        self
    }

    /// Build the event.
    /// Returns an error if no rule was registered.
    pub fn build(self) -> Result<Event<T, S>, BuildError> {
        if self.transitions.is_empty() {
            return Err(BuildError::NoTransitions { event: self.name });
        }
        let callbacks = self
            .callbacks
            .into_iter()
            .filter_map(|(slot, callbacks)| Callback::collapse(callbacks).map(|cb| (slot, cb)))
            .collect();
        Ok(Event::new(
            self.name,
            self.transitions,
            self.guards,
            self.unless,
            callbacks,
        ))
    }
}

impl<T: 'static, S: State + 'static> EventBuilder<T, S> {
    /// Event-level guard from a boolean predicate over the host.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.guard(Callback::when(predicate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Lamp {
        Off,
        On,
        Broken,
    }

    impl State for Lamp {
        fn name(&self) -> &str {
            match self {
                Self::Off => "Off",
                Self::On => "On",
                Self::Broken => "Broken",
            }
        }
    }

    struct Socket;

    fn labels(callbacks: &[Callback<Socket, Lamp>]) -> Vec<String> {
        callbacks.iter().map(Callback::label).collect()
    }

    #[test]
    fn event_without_rules_is_rejected() {
        let result = EventBuilder::<Socket, Lamp>::new("toggle").build();
        assert!(matches!(result, Err(BuildError::NoTransitions { ref event }) if event == "toggle"));
    }

    #[test]
    fn rule_errors_propagate() {
        let result = EventBuilder::<Socket, Lamp>::new("toggle")
            .transition(RuleBuilder::new().to(Lamp::On));
        assert!(matches!(result, Err(BuildError::MissingFromState)));
    }

    #[test]
    fn event_guards_run_before_rule_guards_and_unless_after() {
        let event = EventBuilder::<Socket, Lamp>::new("switch_on")
            .guard("has_power")
            .unless("is_fused")
            .transition(
                RuleBuilder::new()
                    .from(Lamp::Off)
                    .to(Lamp::On)
                    .guard("has_bulb")
                    .unless("is_jammed"),
            )
            .unwrap()
            .build()
            .unwrap();

        let rule = &event.transitions()[0];
        assert_eq!(labels(rule.guards()), vec!["has_power", "has_bulb"]);
        assert_eq!(labels(rule.unless_guards()), vec!["is_jammed", "is_fused"]);
    }

    #[test]
    fn later_event_guards_do_not_reach_earlier_rules() {
        let event = EventBuilder::<Socket, Lamp>::new("switch_on")
            .transition(RuleBuilder::new().from(Lamp::Off).to(Lamp::On))
            .unwrap()
            .guard("has_power")
            .transition(RuleBuilder::new().from(Lamp::Broken).to(Lamp::On))
            .unwrap()
            .build()
            .unwrap();

        assert!(event.transitions()[0].guards().is_empty());
        assert_eq!(labels(event.transitions()[1].guards()), vec!["has_power"]);
        assert_eq!(labels(event.guards()), vec!["has_power"]);
    }

    #[test]
    fn rules_are_bound_to_the_event_in_order() {
        let event = EventBuilder::<Socket, Lamp>::new("repair")
            .transition(
                RuleBuilder::new()
                    .from(Lamp::Broken)
                    .from(Lamp::On)
                    .to(Lamp::Off),
            )
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(event.name(), "repair");
        assert_eq!(event.transitions().len(), 2);
        assert!(event.transitions().iter().all(|rule| rule.event == "repair"));
        assert_eq!(event.transitions()[0].from(), Some(&Lamp::Broken));
    }

    #[test]
    fn slot_callbacks_accumulate() {
        let event = EventBuilder::<Socket, Lamp>::new("switch_on")
            .before("log")
            .before("meter")
            .after("notify")
            .transition(RuleBuilder::new().from(Lamp::Off).to(Lamp::On))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            event.callback(CallbackSlot::Before).map(Callback::label),
            Some("[log, meter]".to_string())
        );
        assert_eq!(
            event.callback(CallbackSlot::After).map(Callback::label),
            Some("notify".to_string())
        );
        assert!(event.callback(CallbackSlot::Error).is_none());
    }
}
