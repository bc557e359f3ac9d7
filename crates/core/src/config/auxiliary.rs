use serde::{Deserialize, Serialize};

/// How an auxiliary pattern is compared against a command name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Pattern appears anywhere in the name (`rebuild-and-serve` contains `build`)
    #[default]
    Substring,
    /// Name starts with the pattern (`build:prod` but not `rebuild`)
    Prefix,
    /// Name equals the pattern
    Exact,
}

/// Classifies manifest commands as auxiliary tooling (tests, linters, builds,
/// installers) that should never be offered as a long-running entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuxiliaryFilter {
    pub patterns: Vec<String>,
    #[serde(rename = "match")]
    pub mode: MatchMode,
}

impl Default for AuxiliaryFilter {
    fn default() -> Self {
        Self {
            patterns: ["test", "lint", "build", "install"]
                .into_iter()
                .map(String::from)
                .collect(),
            mode: MatchMode::Substring,
        }
    }
}

impl AuxiliaryFilter {
    pub fn new(patterns: Vec<String>, mode: MatchMode) -> Self {
        Self { patterns, mode }
    }

    pub fn is_auxiliary(&self, command: &str) -> bool {
        self.patterns.iter().any(|pattern| match self.mode {
            MatchMode::Substring => command.contains(pattern.as_str()),
            MatchMode::Prefix => command.starts_with(pattern.as_str()),
            MatchMode::Exact => command == pattern,
        })
    }

    pub fn is_runnable(&self, command: &str) -> bool {
        !self.is_auxiliary(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_uses_substring_matching() {
        let filter = AuxiliaryFilter::default();

        assert!(filter.is_auxiliary("test"));
        assert!(filter.is_auxiliary("test:watch"));
        assert!(filter.is_auxiliary("prebuild"));
        assert!(filter.is_auxiliary("postinstall"));
        assert!(filter.is_runnable("start"));
        assert!(filter.is_runnable("dev"));
        assert!(filter.is_runnable("serve"));
    }

    #[test]
    fn test_substring_misclassifies_compound_names() {
        let filter = AuxiliaryFilter::default();
        assert!(filter.is_auxiliary("rebuild-and-serve"));

        let prefix = AuxiliaryFilter {
            mode: MatchMode::Prefix,
            ..Default::default()
        };
        assert!(prefix.is_runnable("rebuild-and-serve"));
        assert!(prefix.is_auxiliary("build:prod"));
    }

    #[test]
    fn test_exact_mode() {
        let filter = AuxiliaryFilter::new(vec!["lint".to_string()], MatchMode::Exact);
        assert!(filter.is_auxiliary("lint"));
        assert!(filter.is_runnable("lint:fix"));
        assert!(filter.is_runnable("test"));
    }

    #[test]
    fn test_match_mode_from_json() {
        let filter: AuxiliaryFilter =
            serde_json::from_str(r#"{ "patterns": ["e2e"], "match": "prefix" }"#).unwrap();
        assert_eq!(filter.mode, MatchMode::Prefix);
        assert_eq!(filter.patterns, vec!["e2e".to_string()]);

        // Missing fields fall back to defaults
        let filter: AuxiliaryFilter = serde_json::from_str(r#"{ "match": "exact" }"#).unwrap();
        assert_eq!(filter.patterns.len(), 4);
    }
}
