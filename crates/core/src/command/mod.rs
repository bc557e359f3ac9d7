//! Service command generation and execution

pub mod service_command;

// Re-export commonly used types
pub use service_command::ServiceCommand;
