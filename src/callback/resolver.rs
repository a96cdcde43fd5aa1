//! Resolution and dispatch of callback declarations against a host.
//!
//! Named references are looked up lazily, one leaf at a time, so a guard
//! list that short-circuits never resolves the members after the one that
//! failed.

use crate::callback::host::Host;
use crate::callback::declaration::{Callback, Method};
use crate::core::{truthy, State, TransitionContext};
use crate::engine::TransitionError;
use serde_json::Value;
use std::any::type_name;
use tracing::trace;

/// Resolve a single declaration into an invocable method.
///
/// Lists have no single invocable form and resolve to `None`; callers
/// iterate their members under the combination policy they need.
pub fn resolve<T, S>(callback: &Callback<T, S>, host: &T) -> Result<Option<Method<T, S>>, TransitionError>
where
    T: Host<S>,
    S: State,
{
    match callback {
        Callback::Named(name) => host
            .method(name)
            .map(Some)
            .ok_or_else(|| TransitionError::MissingCallback {
                name: name.clone(),
                object: type_name::<T>().to_string(),
            }),
        Callback::Inline(method) => Ok(Some(method.clone())),
        Callback::List(_) => Ok(None),
    }
}

/// Invoke a declaration and return its value.
///
/// A list invokes every member in order and yields their values as an
/// array.
pub fn invoke<T, S>(
    callback: &Callback<T, S>,
    host: &mut T,
    context: &TransitionContext<S>,
    args: &[Value],
) -> Result<Value, TransitionError>
where
    T: Host<S>,
    S: State,
{
    match callback {
        Callback::List(items) => collect(items, host, context, args).map(Value::Array),
        leaf => call_leaf(leaf, host, context, args),
    }
}

/// Invoke every declaration in order, collecting the values.
pub fn collect<T, S>(
    callbacks: &[Callback<T, S>],
    host: &mut T,
    context: &TransitionContext<S>,
    args: &[Value],
) -> Result<Vec<Value>, TransitionError>
where
    T: Host<S>,
    S: State,
{
    callbacks
        .iter()
        .map(|callback| invoke(callback, host, context, args))
        .collect()
}

/// AND over predicates, stopping at the first falsy one.
///
/// Nested lists are flattened under the same policy. An empty list passes.
pub fn all<T, S>(
    callbacks: &[Callback<T, S>],
    host: &mut T,
    context: &TransitionContext<S>,
    args: &[Value],
) -> Result<bool, TransitionError>
where
    T: Host<S>,
    S: State,
{
    for callback in callbacks {
        let passed = match callback {
            Callback::List(items) => all(items, host, context, args)?,
            leaf => truthy(&call_leaf(leaf, host, context, args)?),
        };
        if !passed {
            return Ok(false);
        }
    }
    Ok(true)
}

/// NOR over predicates: passes only when every member is falsy, stopping
/// at the first truthy one. An empty list passes.
pub fn none_of<T, S>(
    callbacks: &[Callback<T, S>],
    host: &mut T,
    context: &TransitionContext<S>,
    args: &[Value],
) -> Result<bool, TransitionError>
where
    T: Host<S>,
    S: State,
{
    for callback in callbacks {
        let passed = match callback {
            Callback::List(items) => none_of(items, host, context, args)?,
            leaf => !truthy(&call_leaf(leaf, host, context, args)?),
        };
        if !passed {
            return Ok(false);
        }
    }
    Ok(true)
}

fn call_leaf<T, S>(
    callback: &Callback<T, S>,
    host: &mut T,
    context: &TransitionContext<S>,
    args: &[Value],
) -> Result<Value, TransitionError>
where
    T: Host<S>,
    S: State,
{
    let Some(method) = resolve(callback, host)? else {
        return invoke(callback, host, context, args);
    };
    trace!(
        callback = %callback.label(),
        arity = ?method.arity(),
        event = %context.event,
        "invoking callback"
    );
    method
        .call(host, context, args)
        .map_err(|source| TransitionError::CallbackFailed {
            callback: callback.label(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::{Arity, CallbackError, MethodTable};
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Gate {
        Open,
        Shut,
    }

    impl State for Gate {
        fn name(&self) -> &str {
            match self {
                Self::Open => "Open",
                Self::Shut => "Shut",
            }
        }
    }

    struct Keeper {
        state: Gate,
        calls: Vec<String>,
        table: Arc<MethodTable<Keeper, Gate>>,
    }

    impl Host<Gate> for Keeper {
        fn current_state(&self) -> Gate {
            self.state.clone()
        }

        fn method(&self, name: &str) -> Option<Method<Self, Gate>> {
            self.table.get(name)
        }
    }

    fn recording(name: &'static str, result: bool) -> Method<Keeper, Gate> {
        Method::new(Arity::Fixed(0), move |keeper: &mut Keeper, _, _| {
            keeper.calls.push(name.to_string());
            Ok(Value::Bool(result))
        })
    }

    fn keeper() -> Keeper {
        let mut table = MethodTable::new();
        table.insert("yes", recording("yes", true));
        table.insert("no", recording("no", false));
        table.insert(
            "echo",
            Method::new(Arity::Variadic, |keeper: &mut Keeper, _, args: &[Value]| {
                keeper.calls.push(format!("echo/{}", args.len()));
                Ok(Value::Array(args.to_vec()))
            }),
        );
        table.insert(
            "first",
            Method::new(Arity::Fixed(1), |_: &mut Keeper, _, args: &[Value]| {
                Ok(Value::Array(args.to_vec()))
            }),
        );
        table.insert(
            "explode",
            Method::new(Arity::Fixed(0), |_: &mut Keeper, _, _| {
                Err(CallbackError::new("boom"))
            }),
        );
        Keeper {
            state: Gate::Open,
            calls: Vec::new(),
            table: Arc::new(table),
        }
    }

    fn ctx() -> TransitionContext<Gate> {
        TransitionContext::new("shut", Gate::Open, vec![Gate::Shut])
    }

    #[test]
    fn missing_named_reference_is_a_hard_error() {
        let mut keeper = keeper();
        let err = invoke(&Callback::named("nope"), &mut keeper, &ctx(), &[]).unwrap_err();

        match err {
            TransitionError::MissingCallback { name, object } => {
                assert_eq!(name, "nope");
                assert!(object.ends_with("Keeper"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn guard_list_short_circuits_on_first_false() {
        let mut keeper = keeper();
        let guards = vec![Callback::named("no"), Callback::named("yes")];

        assert!(!all(&guards, &mut keeper, &ctx(), &[]).unwrap());
        assert_eq!(keeper.calls, vec!["no"]);
    }

    #[test]
    fn short_circuit_skips_resolution_of_later_members() {
        let mut keeper = keeper();
        let guards = vec![Callback::named("no"), Callback::named("undefined")];

        assert!(!all(&guards, &mut keeper, &ctx(), &[]).unwrap());
    }

    #[test]
    fn unless_list_requires_every_member_false() {
        let mut keeper = keeper();
        assert!(none_of(&[Callback::named("no")], &mut keeper, &ctx(), &[]).unwrap());
        assert!(!none_of(
            &[Callback::named("no"), Callback::named("yes")],
            &mut keeper,
            &ctx(),
            &[]
        )
        .unwrap());
    }

    #[test]
    fn nested_lists_flatten_under_the_same_policy() {
        let mut keeper = keeper();
        let guards = vec![Callback::list(vec![
            Callback::named("yes"),
            Callback::named("no"),
        ])];
        assert!(!all(&guards, &mut keeper, &ctx(), &[]).unwrap());
        assert!(!none_of(&guards, &mut keeper, &ctx(), &[]).unwrap());
    }

    #[test]
    fn empty_lists_pass() {
        let mut keeper = keeper();
        assert!(all(&[], &mut keeper, &ctx(), &[]).unwrap());
        assert!(none_of(&[], &mut keeper, &ctx(), &[]).unwrap());
        assert!(keeper.calls.is_empty());
    }

    #[test]
    fn list_invocation_collects_values_in_order() {
        let mut keeper = keeper();
        let chain = Callback::list(vec![
            Callback::named("yes"),
            Callback::named("echo"),
            Callback::named("no"),
        ]);

        let value = invoke(&chain, &mut keeper, &ctx(), &[json!("a")]).unwrap();

        assert_eq!(value, json!([true, ["a"], false]));
        assert_eq!(keeper.calls, vec!["yes", "echo/1", "no"]);
    }

    #[test]
    fn arity_is_applied_at_the_point_of_invocation() {
        let mut keeper = keeper();
        let args = [json!(1), json!(2), json!(3)];

        assert_eq!(
            invoke(&Callback::named("first"), &mut keeper, &ctx(), &args).unwrap(),
            json!([1])
        );
        assert_eq!(
            invoke(&Callback::named("echo"), &mut keeper, &ctx(), &args).unwrap(),
            json!([1, 2, 3])
        );
    }

    #[test]
    fn callback_failure_carries_label_and_source() {
        let mut keeper = keeper();
        let err = invoke(&Callback::named("explode"), &mut keeper, &ctx(), &[]).unwrap_err();

        assert_eq!(
            err,
            TransitionError::CallbackFailed {
                callback: "explode".to_string(),
                source: CallbackError::new("boom"),
            }
        );
    }

    #[test]
    fn resolve_returns_none_for_lists() {
        let keeper = keeper();
        let list: Callback<Keeper, Gate> = Callback::list(vec![Callback::named("yes")]);
        assert!(resolve(&list, &keeper).unwrap().is_none());
        assert!(resolve(&Callback::named("yes"), &keeper).unwrap().is_some());
    }
}
