//! Builder for machines.

use crate::builder::error::BuildError;
use crate::builder::event::EventBuilder;
use crate::core::State;
use crate::engine::Event;
use crate::machine::{Machine, MachineConfig};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for a machine with a fluent API.
///
/// Event builder failures are collected rather than returned one by one;
/// `build` reports every problem found in the registry at once.
pub struct MachineBuilder<T, S: State> {
    initial: Option<S>,
    config: MachineConfig,
    events: Vec<Event<T, S>>,
    rejected: Vec<BuildError>,
}

impl<T, S: State> MachineBuilder<T, S> {
    pub fn new() -> Self {
        Self {
            initial: None,
            config: MachineConfig::default(),
            events: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Build and add an event. A failure is kept and reported by `build`.
    pub fn event(mut self, builder: EventBuilder<T, S>) -> Self {
        match builder.build() {
            Ok(event) => self.events.push(event),
            Err(err) => self.rejected.push(err),
        }
        self
    }

    /// Add a pre-built event.
    pub fn add_event(mut self, event: Event<T, S>) -> Self {
        self.events.push(event);
        self
    }

    /// Validate the registry and build the machine.
    pub fn build(self) -> Result<Machine<T, S>, BuildError> {
        if let Validation::Failure(problems) = self.validate() {
            let mut problems = problems.into_vec();
            return Err(if problems.len() == 1 {
                problems.remove(0)
            } else {
                BuildError::Invalid(problems)
            });
        }
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        Ok(Machine::new(initial, self.events, self.config))
    }

    fn validate(&self) -> Validation<(), NonEmptyVec<BuildError>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<BuildError>>> = Vec::new();

        checks.push(if self.initial.is_some() {
            Validation::success(())
        } else {
            Validation::fail(BuildError::MissingInitialState)
        });

        if self.events.is_empty() && self.rejected.is_empty() {
            checks.push(Validation::fail(BuildError::NoEvents));
        }

        for err in &self.rejected {
            checks.push(Validation::fail(err.clone()));
        }

        for (index, event) in self.events.iter().enumerate() {
            let duplicate = self.events[..index]
                .iter()
                .any(|earlier| earlier.name() == event.name());
            if duplicate {
                checks.push(Validation::fail(BuildError::DuplicateEvent {
                    event: event.name().to_string(),
                }));
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }
}

impl<T, S: State> Default for MachineBuilder<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RuleBuilder;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Account {
        Pending,
        Active,
        Closed,
    }

    impl State for Account {
        fn name(&self) -> &str {
            match self {
                Self::Pending => "Pending",
                Self::Active => "Active",
                Self::Closed => "Closed",
            }
        }

        fn is_final(&self) -> bool {
            matches!(self, Self::Closed)
        }
    }

    struct Ledger;

    fn activate() -> EventBuilder<Ledger, Account> {
        EventBuilder::new("activate")
            .transition(RuleBuilder::new().from(Account::Pending).to(Account::Active))
            .unwrap()
    }

    #[test]
    fn builder_requires_initial_state() {
        let result = MachineBuilder::<Ledger, Account>::new().event(activate()).build();
        assert!(matches!(result, Err(BuildError::MissingInitialState)));
    }

    #[test]
    fn builder_requires_events() {
        let result = MachineBuilder::<Ledger, Account>::new()
            .initial(Account::Pending)
            .build();
        assert!(matches!(result, Err(BuildError::NoEvents)));
    }

    #[test]
    fn builder_reports_every_problem() {
        let result = MachineBuilder::<Ledger, Account>::new()
            .event(activate())
            .event(activate())
            .event(EventBuilder::new("close"))
            .build();

        let Err(BuildError::Invalid(problems)) = result else {
            panic!("expected accumulated problems");
        };
        assert_eq!(
            problems,
            vec![
                BuildError::MissingInitialState,
                BuildError::NoTransitions {
                    event: "close".to_string()
                },
                BuildError::DuplicateEvent {
                    event: "activate".to_string()
                },
            ]
        );
    }

    #[test]
    fn fluent_api_builds_machine() {
        let machine = MachineBuilder::<Ledger, Account>::new()
            .initial(Account::Pending)
            .config(MachineConfig::silent())
            .event(activate())
            .event(
                EventBuilder::new("close")
                    .transition(
                        RuleBuilder::new()
                            .from(Account::Pending)
                            .from(Account::Active)
                            .to(Account::Closed),
                    )
                    .unwrap(),
            )
            .build()
            .unwrap();

        assert_eq!(machine.initial_state(), &Account::Pending);
        assert!(!machine.config().whiny_transitions);
        assert_eq!(machine.events().len(), 2);
        assert_eq!(machine.events_from(&Account::Active), vec!["close"]);
        assert_eq!(machine.events_from(&Account::Pending), vec!["activate", "close"]);
        assert!(machine.events_from(&Account::Closed).is_empty());
    }
}
