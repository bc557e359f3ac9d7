use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{AuxiliaryFilter, PreconditionConfig, RunnerConfig, ShutdownConfig};

/// File names searched for, in order, in each directory from the workspace up
pub const CONFIG_FILE_NAMES: [&str; 2] = [".service-runner.json", "service-runner.json"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    /// Directory holding one sub-directory per service, relative to the workspace
    pub services_dir: PathBuf,
    /// Manifest file looked up inside each service directory
    pub manifest_file: String,
    pub runner: RunnerConfig,
    pub auxiliary: AuxiliaryFilter,
    pub shutdown: ShutdownConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precondition: Option<PreconditionConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            services_dir: PathBuf::from("services"),
            manifest_file: "package.json".to_string(),
            runner: RunnerConfig::default(),
            auxiliary: AuxiliaryFilter::default(),
            shutdown: ShutdownConfig::default(),
            precondition: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents).map_err(|e| {
            Error::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let mut contents = serde_json::to_string_pretty(self)?;
        contents.push('\n');
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            for name in CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    debug!("Found config at {}", config_path.display());
                    return Some(config_path);
                }
            }

            current = current.parent()?;
        }
    }

    pub fn services_path(&self, workspace_root: &Path) -> PathBuf {
        if self.services_dir.is_absolute() {
            self.services_dir.clone()
        } else {
            workspace_root.join(&self.services_dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MatchMode, RunTarget};
    use tempfile::TempDir;

    #[test]
    fn test_defaults_from_empty_object() {
        let config: Config = serde_json::from_str("{}").unwrap();

        assert_eq!(config.services_dir, PathBuf::from("services"));
        assert_eq!(config.manifest_file, "package.json");
        assert_eq!(config.runner.args, vec!["run".to_string()]);
        assert_eq!(config.runner.target, RunTarget::Name);
        assert_eq!(config.auxiliary.mode, MatchMode::Substring);
        assert_eq!(config.shutdown.grace_ms, 5000);
        assert!(config.shutdown.timeout_ms.is_none());
        assert!(config.precondition.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            services_dir: PathBuf::from("apps"),
            runner: RunnerConfig::shell(),
            precondition: Some(PreconditionConfig {
                label: "database".to_string(),
                program: "npm".to_string(),
                args: vec!["run".to_string(), "db:up".to_string()],
            }),
            ..Default::default()
        };

        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.services_dir, PathBuf::from("apps"));
        assert_eq!(parsed.runner, RunnerConfig::shell());
        assert_eq!(parsed.precondition.unwrap().label, "database");
    }

    #[test]
    fn test_find_config_file_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            temp.path().join(".service-runner.json"),
            r#"{ "services_dir": "svc" }"#,
        )
        .unwrap();

        let found = Config::find_config_file(&nested).unwrap();
        assert_eq!(found, temp.path().join(".service-runner.json"));

        let config = Config::load_from_file(&found).unwrap();
        assert_eq!(config.services_path(&nested), nested.join("svc"));
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".service-runner.json");

        let config = Config {
            manifest_file: "service.json".to_string(),
            shutdown: ShutdownConfig {
                grace_ms: 250,
                timeout_ms: Some(1000),
            },
            ..Default::default()
        };
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.manifest_file, "service.json");
        assert_eq!(loaded.shutdown, config.shutdown);
        assert_eq!(loaded.runner, RunnerConfig::default());
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing").join(".service-runner.json");

        let err = Config::default().save_to_file(&path).unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("service-runner.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }
}
