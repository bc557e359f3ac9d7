use std::io;
use std::path::PathBuf;

/// Errors that can occur during service-runner operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Workspace not found: {}", .0.display())]
    WorkspaceNotFound(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Manifest error in {}: {reason}", .path.display())]
    ManifestError { path: PathBuf, reason: String },

    #[error("Failed to spawn '{command}' for {service}: {source}")]
    SpawnError {
        service: String,
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for service-runner operations
pub type Result<T> = std::result::Result<T, Error>;
