//! Configuration management for service-runner

mod auxiliary;
mod runner;
mod settings;

// Re-export main types
pub use auxiliary::{AuxiliaryFilter, MatchMode};
pub use runner::{PreconditionConfig, RunTarget, RunnerConfig, ShutdownConfig};
pub use settings::{CONFIG_FILE_NAMES, Config};
