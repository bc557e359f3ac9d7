use service_runner_core::Config;
use service_runner_core::config::{PreconditionConfig, RunnerConfig};

/// Starter configuration written by `init`: the platform defaults plus a
/// `database` precondition run through the same runner
pub fn default_config_template() -> Config {
    let runner = RunnerConfig::default();
    let mut args = runner.args.clone();
    args.push("db:up".to_string());

    Config {
        precondition: Some(PreconditionConfig {
            label: "database".to_string(),
            program: runner.program.clone(),
            args,
        }),
        runner,
        ..Config::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use service_runner_core::config::{MatchMode, RunTarget};

    #[test]
    fn test_template_uses_platform_runner() {
        let config = default_config_template();

        assert_eq!(config.manifest_file, "package.json");
        assert_eq!(config.runner, RunnerConfig::default());
        assert_eq!(config.runner.target, RunTarget::Name);
        assert_eq!(config.auxiliary.mode, MatchMode::Substring);
        assert_eq!(config.shutdown.timeout_ms, None);

        let precondition = config.precondition.unwrap();
        assert_eq!(precondition.program, RunnerConfig::default().program);
        assert_eq!(precondition.args, vec!["run", "db:up"]);
    }

    #[cfg(windows)]
    #[test]
    fn test_template_runner_on_windows() {
        assert_eq!(default_config_template().runner.program, "npm.cmd");
    }
}
