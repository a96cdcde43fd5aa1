//! Builder for transition rules.

use crate::builder::error::BuildError;
use crate::callback::Callback;
use crate::core::State;
use crate::engine::TransitionRule;

enum Source<S> {
    Unset,
    Any,
    States(Vec<S>),
}

/// Fluent builder for one edge, or one edge per source state.
///
/// A rule must name its source explicitly: `.from(state)` (repeatable) or
/// `.from_any()` for a wildcard rule.
pub struct RuleBuilder<T, S: State> {
    source: Source<S>,
    to: Vec<S>,
    guards: Vec<Callback<T, S>>,
    unless: Vec<Callback<T, S>>,
    after: Vec<Callback<T, S>>,
    success: Vec<Callback<T, S>>,
}

impl<T, S: State> RuleBuilder<T, S> {
    pub fn new() -> Self {
        Self {
            source: Source::Unset,
            to: Vec::new(),
            guards: Vec::new(),
            unless: Vec::new(),
            after: Vec::new(),
            success: Vec::new(),
        }
    }

    /// Add a source state. Calling it again adds another source; the event
    /// registers one rule per source.
    pub fn from(mut self, state: S) -> Self {
        self.source = match self.source {
            Source::States(mut states) => {
                states.push(state);
                Source::States(states)
            }
            Source::Unset | Source::Any => Source::States(vec![state]),
        };
        self
    }

    /// Match any current state.
    pub fn from_any(mut self) -> Self {
        self.source = Source::Any;
        self
    }

    /// Add a destination. The first one is the default target.
    pub fn to(mut self, state: S) -> Self {
        self.to.push(state);
        self
    }

    pub fn to_each(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.to.extend(states);
        self
    }

    pub fn guard(mut self, guard: impl Into<Callback<T, S>>) -> Self {
        self.guards.push(guard.into());
        self
    }

    pub fn unless(mut self, predicate: impl Into<Callback<T, S>>) -> Self {
        self.unless.push(predicate.into());
        self
    }

    /// Callback run when this rule executes. Its value is the fire result.
    pub fn after(mut self, callback: impl Into<Callback<T, S>>) -> Self {
        self.after.push(callback.into());
        self
    }

    /// Callback run once the new state has been persisted.
    pub fn success(mut self, callback: impl Into<Callback<T, S>>) -> Self {
        self.success.push(callback.into());
        self
    }

    /// Build a standalone rule with a single source.
    pub fn build(self) -> Result<TransitionRule<T, S>, BuildError> {
        let mut rules = self.expand()?;
        if rules.len() > 1 {
            return Err(BuildError::AmbiguousFromState { count: rules.len() });
        }
        rules.pop().ok_or(BuildError::MissingFromState)
    }

    /// One rule per declared source.
    pub(crate) fn expand(self) -> Result<Vec<TransitionRule<T, S>>, BuildError> {
        let sources: Vec<Option<S>> = match self.source {
            Source::Unset => return Err(BuildError::MissingFromState),
            Source::Any => vec![None],
            Source::States(states) => states.into_iter().map(Some).collect(),
        };
        if self.to.is_empty() {
            return Err(BuildError::MissingToState);
        }

        let after = Callback::collapse(self.after);
        let success = Callback::collapse(self.success);
        Ok(sources
            .into_iter()
            .map(|from| TransitionRule {
                event: String::new(),
                from,
                to: self.to.clone(),
                guards: self.guards.clone(),
                unless: self.unless.clone(),
                after: after.clone(),
                success: success.clone(),
            })
            .collect())
    }
}

impl<T: 'static, S: State + 'static> RuleBuilder<T, S> {
    /// Add a guard from a boolean predicate over the host.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.guard(Callback::when(predicate))
    }
}

impl<T, S: State> Default for RuleBuilder<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Job {
        Queued,
        Running,
        Done,
    }

    impl State for Job {
        fn name(&self) -> &str {
            match self {
                Self::Queued => "Queued",
                Self::Running => "Running",
                Self::Done => "Done",
            }
        }
    }

    struct Worker;

    #[test]
    fn source_is_required() {
        let result = RuleBuilder::<Worker, Job>::new().to(Job::Running).build();
        assert!(matches!(result, Err(BuildError::MissingFromState)));
    }

    #[test]
    fn destination_is_required() {
        let result = RuleBuilder::<Worker, Job>::new().from(Job::Queued).build();
        assert!(matches!(result, Err(BuildError::MissingToState)));
    }

    #[test]
    fn several_sources_expand_to_one_rule_each() {
        let builder = RuleBuilder::<Worker, Job>::new()
            .from(Job::Queued)
            .from(Job::Running)
            .to(Job::Done)
            .guard("ready");

        let rules = builder.expand().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].from(), Some(&Job::Queued));
        assert_eq!(rules[1].from(), Some(&Job::Running));
        assert_eq!(rules[1].guards().len(), 1);
    }

    #[test]
    fn standalone_build_rejects_several_sources() {
        let result = RuleBuilder::<Worker, Job>::new()
            .from(Job::Queued)
            .from(Job::Running)
            .to(Job::Done)
            .build();
        assert!(matches!(result, Err(BuildError::AmbiguousFromState { count: 2 })));
    }

    #[test]
    fn from_any_builds_wildcard() {
        let rule = RuleBuilder::<Worker, Job>::new()
            .from_any()
            .to_each([Job::Running, Job::Done])
            .build()
            .unwrap();
        assert!(rule.is_wildcard());
        assert_eq!(rule.to(), &[Job::Running, Job::Done]);
    }

    #[test]
    fn single_after_stays_unwrapped() {
        let rule = RuleBuilder::<Worker, Job>::new()
            .from(Job::Queued)
            .to(Job::Running)
            .after("start")
            .success("notify")
            .success("audit")
            .build()
            .unwrap();

        assert!(matches!(rule.after, Some(Callback::Named(ref name)) if name == "start"));
        assert!(matches!(rule.success, Some(Callback::List(ref items)) if items.len() == 2));
    }
}
