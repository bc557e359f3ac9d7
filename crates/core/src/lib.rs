//! service-runner - discover, launch and supervise the services of a workspace
//!
//! This crate provides functionality to:
//! - Discover services and classify their manifest commands
//! - Resolve operator selections and pick one command per service
//! - Run the chosen services concurrently with labeled, multiplexed output
//! - Stop every child together when the supervisor is interrupted
pub mod command;
pub mod config;
pub mod error;
pub mod precondition;
pub mod registry;
pub mod resolver;
pub mod selector;
pub mod supervisor;
pub mod types;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use types::*;

// Re-export main API components
pub use command::ServiceCommand;
pub use config::Config;
pub use registry::{Discovery, discover};
pub use resolver::{Disambiguator, Resolution, ResolvedSelection, SkipReason};
pub use selector::Selection;
pub use supervisor::{
    ConsoleEvent, ConsoleSink, RunSummary, StopReason, StreamKind, Supervisor, SupervisorOptions,
};
