use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What the runner receives as its final argument
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunTarget {
    /// The command name, e.g. `npm run start`
    #[default]
    Name,
    /// The manifest's invocation string, e.g. `sh -c "node server.js"`
    Invocation,
}

/// The command runner used to start a service's command inside its directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub program: String,
    pub args: Vec<String>,
    pub target: RunTarget,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        let program = if cfg!(windows) { "npm.cmd" } else { "npm" };
        Self {
            program: program.to_string(),
            args: vec!["run".to_string()],
            target: RunTarget::Name,
        }
    }
}

impl RunnerConfig {
    pub fn new(program: impl Into<String>, args: Vec<String>, target: RunTarget) -> Self {
        Self {
            program: program.into(),
            args,
            target,
        }
    }

    /// Runner that hands the invocation string to `sh -c`
    pub fn shell() -> Self {
        Self::new("sh", vec!["-c".to_string()], RunTarget::Invocation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Time a child gets to honour SIGTERM before it is killed outright
    pub grace_ms: u64,
    /// Upper bound on the whole shutdown wait; unbounded when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_ms: 5000,
            timeout_ms: None,
        }
    }
}

impl ShutdownConfig {
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// A one-shot command (e.g. bringing a database up) offered before launch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreconditionConfig {
    pub label: String,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}
