use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Outcome of reading a service's manifest during discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ManifestStatus {
    Loaded,
    Missing,
    Malformed(String),
}

/// A discovered service directory and the commands it can be started with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub name: String,
    pub path: PathBuf,
    /// Runnable commands in manifest order, name -> invocation string
    pub runnable_commands: IndexMap<String, String>,
    pub description: String,
    pub manifest: ManifestStatus,
}

impl ServiceDescriptor {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let name = name.into();
        Self {
            description: default_description(&name),
            name,
            path: path.into(),
            runnable_commands: IndexMap::new(),
            manifest: ManifestStatus::Loaded,
        }
    }

    pub fn with_command(mut self, name: impl Into<String>, invocation: impl Into<String>) -> Self {
        self.runnable_commands.insert(name.into(), invocation.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn command_names(&self) -> Vec<&str> {
        self.runnable_commands.keys().map(String::as_str).collect()
    }

    pub fn invocation(&self, command: &str) -> Option<&str> {
        self.runnable_commands.get(command).map(String::as_str)
    }

    pub fn has_runnable_commands(&self) -> bool {
        !self.runnable_commands.is_empty()
    }
}

pub(crate) fn default_description(name: &str) -> String {
    format!("Service {name}")
}
