//! Callback declarations and the invocable methods they resolve to.

use crate::callback::error::CallbackError;
use crate::core::{State, TransitionContext};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Number of positional arguments a method accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many leading call arguments are forwarded.
    Fixed(usize),
    /// The full argument list is forwarded.
    Variadic,
}

impl Arity {
    /// Leading slice of `args` this arity accepts.
    ///
    /// A fixed arity larger than the argument list forwards what is there.
    pub fn trim<'a>(&self, args: &'a [Value]) -> &'a [Value] {
        match self {
            Self::Fixed(n) => &args[..(*n).min(args.len())],
            Self::Variadic => args,
        }
    }
}

/// Signature shared by every invocable callback body.
pub type MethodFn<T, S> = Arc<
    dyn Fn(&mut T, &TransitionContext<S>, &[Value]) -> Result<Value, CallbackError> + Send + Sync,
>;

/// A callable with a declared arity.
///
/// Hosts expose their named methods as `Method`s and inline callbacks are
/// `Method`s as well, so both dispatch through the same trimming path.
pub struct Method<T, S: State> {
    arity: Arity,
    func: MethodFn<T, S>,
}

impl<T: 'static, S: State + 'static> Method<T, S> {
    pub fn new<F>(arity: Arity, func: F) -> Self
    where
        F: Fn(&mut T, &TransitionContext<S>, &[Value]) -> Result<Value, CallbackError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            arity,
            func: Arc::new(func),
        }
    }
}

impl<T, S: State> Method<T, S> {
    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Invoke with `args` trimmed to the declared arity.
    pub fn call(
        &self,
        host: &mut T,
        context: &TransitionContext<S>,
        args: &[Value],
    ) -> Result<Value, CallbackError> {
        (self.func)(host, context, self.arity.trim(args))
    }
}

impl<T, S: State> Clone for Method<T, S> {
    fn clone(&self) -> Self {
        Self {
            arity: self.arity,
            func: Arc::clone(&self.func),
        }
    }
}

impl<T, S: State> fmt::Debug for Method<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method").field("arity", &self.arity).finish()
    }
}

/// Declaration of a guard, predicate or callback.
///
/// An absent declaration is modelled by the holder (`Option::None` or an
/// empty list) rather than a variant. How a `List` combines its members
/// (AND, NOR or collect-all) is decided by the caller.
pub enum Callback<T, S: State> {
    /// Reference to a method the host exposes through `Host::method`.
    Named(String),
    /// Function executed with the host passed as its receiver.
    Inline(Method<T, S>),
    /// Ordered list of declarations.
    List(Vec<Callback<T, S>>),
}

impl<T, S: State> Callback<T, S> {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn list(callbacks: impl IntoIterator<Item = Callback<T, S>>) -> Self {
        Self::List(callbacks.into_iter().collect())
    }

    /// Label used in log fields and error messages.
    pub fn label(&self) -> String {
        match self {
            Self::Named(name) => name.clone(),
            Self::Inline(method) => format!("<inline/{:?}>", method.arity()),
            Self::List(items) => {
                let labels: Vec<String> = items.iter().map(Callback::label).collect();
                format!("[{}]", labels.join(", "))
            }
        }
    }

    /// Collapse several declarations the way registration does: none is
    /// absent, one stays a single declaration, more become an ordered list.
    pub(crate) fn collapse(mut callbacks: Vec<Callback<T, S>>) -> Option<Self> {
        match callbacks.len() {
            0 => None,
            1 => callbacks.pop(),
            _ => Some(Self::List(callbacks)),
        }
    }
}

impl<T: 'static, S: State + 'static> Callback<T, S> {
    /// Inline callback with an explicit arity.
    pub fn inline<F>(arity: Arity, func: F) -> Self
    where
        F: Fn(&mut T, &TransitionContext<S>, &[Value]) -> Result<Value, CallbackError>
            + Send
            + Sync
            + 'static,
    {
        Self::Inline(Method::new(arity, func))
    }

    /// Zero-arity boolean predicate over the host.
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::inline(Arity::Fixed(0), move |host: &mut T, _, _| {
            Ok(Value::Bool(predicate(&*host)))
        })
    }
}

impl<T, S: State> Clone for Callback<T, S> {
    fn clone(&self) -> Self {
        match self {
            Self::Named(name) => Self::Named(name.clone()),
            Self::Inline(method) => Self::Inline(method.clone()),
            Self::List(items) => Self::List(items.clone()),
        }
    }
}

impl<T, S: State> fmt::Debug for Callback<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl<T, S: State> From<&str> for Callback<T, S> {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl<T, S: State> From<String> for Callback<T, S> {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}
