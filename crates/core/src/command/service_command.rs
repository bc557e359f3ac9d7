use crate::config::{PreconditionConfig, RunTarget, RunnerConfig};
use crate::error::{Error, Result};
use crate::types::ResolvedLaunch;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

/// A fully built invocation: program, arguments and working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl ServiceCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
        }
    }

    /// Command that starts `launch` through the configured runner, inside the
    /// service directory
    pub fn for_launch(launch: &ResolvedLaunch, runner: &RunnerConfig) -> Result<Self> {
        let target = match runner.target {
            RunTarget::Name => launch.command.clone(),
            RunTarget::Invocation => launch
                .invocation()
                .ok_or_else(|| {
                    Error::Other(format!(
                        "Command '{}' is not declared by {}",
                        launch.command,
                        launch.service_name()
                    ))
                })?
                .to_string(),
        };

        let mut args = runner.args.clone();
        args.push(target);

        Ok(Self::new(runner.program.clone(), args).with_working_dir(launch.service.path.clone()))
    }

    pub fn for_precondition(precondition: &PreconditionConfig) -> Self {
        Self::new(precondition.program.clone(), precondition.args.clone())
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn to_shell_command(&self) -> String {
        let mut cmd = quote(&self.program);
        for arg in &self.args {
            cmd.push(' ');
            cmd.push_str(&quote(arg));
        }
        cmd
    }

    /// Async command for a long-running child: piped output, null stdin, and
    /// (on unix) its own process group so the whole tree can be signalled
    pub fn to_tokio_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }

    /// Run to completion with inherited stdio
    pub fn execute(&self) -> io::Result<ExitStatus> {
        let mut cmd = std::process::Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        cmd.status()
    }
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.contains(char::is_whitespace) {
        format!("'{arg}'")
    } else {
        arg.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ServiceDescriptor;

    fn launch(command: &str) -> ResolvedLaunch {
        let service = ServiceDescriptor::new("api", "/srv/api")
            .with_command("start", "node server.js")
            .with_command("dev", "nodemon");
        ResolvedLaunch::new(service, command)
    }

    #[test]
    fn test_runner_receives_command_name() {
        let runner = RunnerConfig::new("npm", vec!["run".to_string()], RunTarget::Name);
        let cmd = ServiceCommand::for_launch(&launch("start"), &runner).unwrap();

        assert_eq!(cmd.program, "npm");
        assert_eq!(cmd.args, vec!["run", "start"]);
        assert_eq!(cmd.working_dir, Some(PathBuf::from("/srv/api")));
        assert_eq!(cmd.to_shell_command(), "npm run start");
    }

    #[test]
    fn test_runner_receives_invocation() {
        let cmd = ServiceCommand::for_launch(&launch("start"), &RunnerConfig::shell()).unwrap();
        assert_eq!(cmd.args, vec!["-c", "node server.js"]);
        assert_eq!(cmd.to_shell_command(), "sh -c 'node server.js'");
    }

    #[test]
    fn test_undeclared_command_with_invocation_target() {
        let err = ServiceCommand::for_launch(&launch("missing"), &RunnerConfig::shell()).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_precondition_command() {
        let precondition = PreconditionConfig {
            label: "database".to_string(),
            program: "docker".to_string(),
            args: vec!["compose".to_string(), "up".to_string(), "-d".to_string()],
        };
        let cmd = ServiceCommand::for_precondition(&precondition).with_working_dir("/srv");
        assert_eq!(cmd.to_shell_command(), "docker compose up -d");
        assert_eq!(cmd.working_dir, Some(PathBuf::from("/srv")));
    }
}
