//! Runtime around the engine: persistence, strict/silent policy,
//! lifecycle hooks, error recovery and per-instance history.

mod config;
mod instance;
mod registry;

pub use config::{ConfigError, MachineConfig};
pub use instance::Instance;
pub use registry::{Machine, Outcome, Persist};
