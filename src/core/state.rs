//! The `State` trait implemented by every machine state.
//!
//! States are plain values. The engine compares them with `PartialEq`,
//! clones them into transition contexts and history records, and uses
//! their serde form to recognise a positional argument as a target state.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for machine states.
///
/// # Required Traits
///
/// - `Clone`: states are copied into contexts, ledgers and history
/// - `PartialEq`: rule matching compares the current state to `from`
/// - `Debug`: states appear in log fields and error messages
/// - `Serialize` + `Deserialize`: a call argument is treated as a target
///   state only when it deserializes into `Self`
///
/// # Example
///
/// ```rust
/// use fireflow::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum DoorState {
///     Open,
///     Closed,
///     Locked,
/// }
///
/// impl State for DoorState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Open => "Open",
///             Self::Closed => "Closed",
///             Self::Locked => "Locked",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Locked)
///     }
/// }
///
/// assert_eq!(DoorState::Closed.name(), "Closed");
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Symbolic name used in logs and error messages.
    fn name(&self) -> &str;

    /// Whether no further transitions are expected from this state.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }

    /// Whether this state represents a failure condition.
    ///
    /// Default implementation returns `false`.
    fn is_error(&self) -> bool {
        false
    }
}
