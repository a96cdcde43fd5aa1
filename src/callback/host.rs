//! The capability contract between the engine and the object it fires on.

use crate::callback::error::CallbackError;
use crate::callback::declaration::{Arity, Method};
use crate::core::{State, TransitionContext};
use serde_json::Value;
use std::collections::HashMap;

/// Object an event is fired against.
///
/// The engine reads the current state and resolves named callback
/// references through `method`. Returning `None` for a referenced name is
/// a configuration defect and surfaces as `TransitionError::MissingCallback`.
pub trait Host<S: State>: Sized {
    /// The state the object is in right now.
    fn current_state(&self) -> S;

    /// Look up a callable by name, including ones not otherwise public.
    fn method(&self, name: &str) -> Option<Method<Self, S>>;
}

/// Name-to-method table a host can delegate `Host::method` to.
///
/// ```rust
/// use fireflow::callback::{Arity, MethodTable};
/// use fireflow::state_enum;
/// use serde_json::{json, Value};
///
/// state_enum! {
///     enum Door { Open, Closed }
/// }
///
/// struct Frame { hinges_ok: bool }
///
/// let table: MethodTable<Frame, Door> = MethodTable::new()
///     .define("can_close", Arity::Fixed(0), |frame: &mut Frame, _, _| {
///         Ok(Value::Bool(frame.hinges_ok))
///     })
///     .define("log", Arity::Variadic, |_, _, args| Ok(json!(args.len())));
///
/// assert!(table.get("can_close").is_some());
/// assert!(table.get("missing").is_none());
/// ```
pub struct MethodTable<T, S: State> {
    methods: HashMap<String, Method<T, S>>,
}

impl<T, S: State> MethodTable<T, S> {
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, method: Method<T, S>) {
        self.methods.insert(name.into(), method);
    }

    pub fn get(&self, name: &str) -> Option<Method<T, S>> {
        self.methods.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl<T: 'static, S: State + 'static> MethodTable<T, S> {
    /// Register `func` under `name`, replacing any previous definition.
    pub fn define<F>(mut self, name: impl Into<String>, arity: Arity, func: F) -> Self
    where
        F: Fn(&mut T, &TransitionContext<S>, &[Value]) -> Result<Value, CallbackError>
            + Send
            + Sync
            + 'static,
    {
        self.insert(name, Method::new(arity, func));
        self
    }
}

impl<T, S: State> Default for MethodTable<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Tap {
        Off,
        On,
    }

    impl State for Tap {
        fn name(&self) -> &str {
            match self {
                Self::Off => "Off",
                Self::On => "On",
            }
        }
    }

    struct Faucet {
        state: Tap,
        flow: i64,
    }

    #[test]
    fn define_replaces_previous_method() {
        let table: MethodTable<Faucet, Tap> = MethodTable::new()
            .define("flow", Arity::Fixed(0), |_, _, _| Ok(json!(1)))
            .define("flow", Arity::Fixed(0), |_, _, _| Ok(json!(2)));

        assert_eq!(table.len(), 1);
        let mut faucet = Faucet {
            state: Tap::Off,
            flow: 0,
        };
        let ctx = TransitionContext::for_event("open", faucet.state.clone());
        let value = table
            .get("flow")
            .unwrap()
            .call(&mut faucet, &ctx, &[])
            .unwrap();
        assert_eq!(value, json!(2));
    }

    #[test]
    fn methods_mutate_the_host() {
        let table: MethodTable<Faucet, Tap> =
            MethodTable::new().define("set_flow", Arity::Fixed(1), |faucet: &mut Faucet, _, args| {
                faucet.flow = args.first().and_then(Value::as_i64).unwrap_or_default();
                Ok(Value::Null)
            });

        let mut faucet = Faucet {
            state: Tap::On,
            flow: 0,
        };
        let ctx = TransitionContext::for_event("open", Tap::On);
        table
            .get("set_flow")
            .unwrap()
            .call(&mut faucet, &ctx, &[json!(7), json!(9)])
            .unwrap();

        assert_eq!(faucet.flow, 7);
        assert!(table.contains("set_flow"));
        assert!(!table.is_empty());
    }
}
