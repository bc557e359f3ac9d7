use anyhow::{Context, Result};
use service_runner_core::Config;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Workspace root plus the configuration that applies to it
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub config: Config,
    /// Config file the settings came from, if any
    pub config_path: Option<PathBuf>,
}

impl Workspace {
    pub fn load(cwd: Option<&Path>, config_path: Option<&Path>) -> Result<Self> {
        let root = match cwd {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().context("Failed to get current directory")?,
        };

        let config_path = match config_path {
            Some(path) => Some(path.to_path_buf()),
            None => Config::find_config_file(&root),
        };

        let config = match &config_path {
            Some(path) => {
                debug!("Using config {}", path.display());
                Config::load_from_file(path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?
            }
            None => Config::default(),
        };

        Ok(Self {
            root,
            config,
            config_path,
        })
    }

    pub fn services_dir(&self) -> PathBuf {
        self.config.services_path(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_config() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::load(Some(temp.path()), None).unwrap();
        assert_eq!(workspace.services_dir(), temp.path().join("services"));
    }

    #[test]
    fn test_explicit_config_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.json");
        std::fs::write(&path, r#"{ "services_dir": "apps" }"#).unwrap();

        let workspace = Workspace::load(Some(temp.path()), Some(&path)).unwrap();
        assert_eq!(workspace.services_dir(), temp.path().join("apps"));
        assert_eq!(workspace.config_path, Some(path));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.json");
        assert!(Workspace::load(Some(temp.path()), Some(&missing)).is_err());
    }
}
