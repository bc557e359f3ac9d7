use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// The subset of a service manifest the registry cares about
#[derive(Debug, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub scripts: IndexMap<String, String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Manifest {
    pub fn parse(contents: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(contents).map_err(|e| Error::ManifestError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Read the manifest at `path`; `Ok(None)` when the file does not exist
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ManifestError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&contents, path).map(Some)
    }

    /// Description text, treating a blank field as absent
    pub fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_scripts_keep_manifest_order() {
        let manifest = Manifest::parse(
            r#"{
                "name": "api",
                "description": "REST API",
                "scripts": { "start": "node index.js", "dev": "nodemon", "lint": "eslint ." }
            }"#,
            Path::new("package.json"),
        )
        .unwrap();

        let names: Vec<&str> = manifest.scripts.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["start", "dev", "lint"]);
        assert_eq!(manifest.description(), Some("REST API"));
    }

    #[test]
    fn test_missing_fields_default() {
        let manifest = Manifest::parse(r#"{ "name": "bare" }"#, Path::new("package.json")).unwrap();
        assert!(manifest.scripts.is_empty());
        assert_eq!(manifest.description(), None);

        let blank = Manifest::parse(r#"{ "description": "  " }"#, Path::new("package.json")).unwrap();
        assert_eq!(blank.description(), None);
    }

    #[test]
    fn test_malformed_manifest_reports_path() {
        let err = Manifest::parse("{ \"scripts\": ", Path::new("svc/package.json")).unwrap_err();
        match err {
            Error::ManifestError { path, .. } => assert_eq!(path, PathBuf::from("svc/package.json")),
            other => panic!("unexpected error: {other:?}"),
        }

        // Non-string script values are also malformed
        assert!(Manifest::parse(r#"{ "scripts": { "start": 1 } }"#, Path::new("p")).is_err());
    }
}
