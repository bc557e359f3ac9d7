use anyhow::{Context, Result, bail};
use colored::Colorize;
use service_runner_core::config::{PreconditionConfig, RunnerConfig};
use service_runner_core::precondition::{is_affirmative, run_precondition};
use service_runner_core::{
    Disambiguator, Error, ResolvedLaunch, ResolvedSelection, RunSummary, Selection,
    ServiceCommand, ServiceDescriptor, SkipReason, StopReason, Supervisor, SupervisorOptions,
    discover, resolver, selector,
};
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::config::Workspace;
use crate::display::{TerminalSink, print_run_summary, print_service_listing};
use crate::utils::{Prompt, ScriptChooser};

#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    /// Selection text used instead of prompting
    pub select: Option<String>,
    /// `(service, command)` answers for services with several commands
    pub scripts: Vec<(String, String)>,
    /// Run (`Some(true)`) or skip (`Some(false)`) the precondition without asking
    pub precondition: Option<bool>,
    pub dry_run: bool,
    /// Overrides `shutdown.timeout_ms` from the config
    pub shutdown_timeout: Option<u64>,
}

pub fn start_command(workspace: &Workspace, options: StartOptions) -> Result<()> {
    let services = discover_services(workspace)?;
    if services.is_empty() {
        println!(
            "{}",
            format!(
                "No services found. Create services in the '{}' directory.",
                workspace.config.services_dir.display()
            )
            .yellow()
        );
        return Ok(());
    }

    let mut prompt = Prompt::stdio();

    if let Some(precondition) = &workspace.config.precondition {
        handle_precondition(workspace, precondition, &options, &mut prompt)?;
    }

    print_service_listing(&services);

    let raw = match &options.select {
        Some(select) => select.clone(),
        None => prompt
            .ask("\nSelect services to start (numbers separated by comma, or \"all\"): ")
            .context("Failed to read selection")?
            .unwrap_or_default(),
    };

    let selected = match selector::resolve(&raw, &services) {
        Selection::Services(selected) => selected,
        Selection::Nothing => {
            println!("{}", "No valid services selected.".yellow());
            return Ok(());
        }
    };
    debug!("Selected {} service(s)", selected.len());

    let mut chooser = ScriptChooser::new(options.scripts.clone(), prompt);
    let launches = resolve_launches(&selected, &mut chooser);

    if launches.is_empty() {
        println!("{}", "No services started.".yellow());
        return Ok(());
    }

    if options.dry_run {
        return print_dry_run(&launches, &workspace.config.runner);
    }

    let mut supervisor_options = SupervisorOptions::from(&workspace.config.shutdown);
    if let Some(ms) = options.shutdown_timeout {
        supervisor_options.shutdown_timeout = Some(Duration::from_millis(ms));
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let (reason, summary) = runtime.block_on(supervise(
        launches,
        &workspace.config.runner,
        supervisor_options,
    ))?;

    print_run_summary(&summary, reason);
    Ok(())
}

/// Discover every service of the workspace, in directory listing order
pub(crate) fn discover_services(workspace: &Workspace) -> Result<Vec<ServiceDescriptor>> {
    match discover(&workspace.root, &workspace.config) {
        Ok(discovery) => Ok(discovery.collect()),
        Err(Error::WorkspaceNotFound(dir)) => {
            bail!("✗ Services directory not found: {}", dir.display())
        }
        Err(e) => Err(e).context("Failed to discover services"),
    }
}

fn handle_precondition<R: BufRead, W: Write>(
    workspace: &Workspace,
    precondition: &PreconditionConfig,
    options: &StartOptions,
    prompt: &mut Prompt<R, W>,
) -> Result<()> {
    let accepted = match options.precondition {
        Some(decided) => decided,
        None => prompt
            .ask(&format!("Start the {}? (y/n): ", precondition.label))
            .context("Failed to read answer")?
            .is_some_and(|answer| is_affirmative(&answer)),
    };

    if !accepted {
        debug!("Skipping {}", precondition.label);
        return Ok(());
    }

    if options.dry_run {
        let command = ServiceCommand::for_precondition(precondition).with_working_dir(&workspace.root);
        println!("{}", command.to_shell_command());
        println!("Working directory: {}", workspace.root.display());
        return Ok(());
    }

    println!("{}", format!("Starting the {}...", precondition.label).yellow());
    match run_precondition(precondition, &workspace.root) {
        Ok(()) => println!(
            "{}",
            format!("✓ {} started successfully", capitalize(&precondition.label)).green()
        ),
        Err(e) => {
            warn!("{} failed: {}", precondition.label, e);
            eprintln!(
                "{}",
                format!("✗ Error starting the {}: {}", precondition.label, e).red()
            );
        }
    }

    Ok(())
}

/// Pick a command for every selected service and report the ones left out
fn resolve_launches(
    selected: &[&ServiceDescriptor],
    chooser: &mut dyn Disambiguator,
) -> Vec<ResolvedLaunch> {
    let ResolvedSelection { launches, skipped } =
        resolver::resolve_all(selected.iter().copied(), chooser);

    for skip in &skipped {
        let message = match skip.reason {
            SkipReason::NoRunnableCommands => {
                format!("✗ The service {} has no executable scripts.", skip.service_name)
            }
            SkipReason::InvalidChoice { .. } => {
                format!("✗ Invalid script selection for {}.", skip.service_name)
            }
        };
        println!("{}", message.red());
    }
    for launch in &launches {
        println!(
            "{}",
            format!("Starting {} with script '{}'...", launch.service_name(), launch.command).yellow()
        );
    }

    launches
}

fn print_dry_run(launches: &[ResolvedLaunch], runner: &RunnerConfig) -> Result<()> {
    for launch in launches {
        let command = ServiceCommand::for_launch(launch, runner)
            .with_context(|| format!("Failed to build command for {}", launch.service_name()))?;

        println!("[{}] {}", launch.service_name(), command.to_shell_command());
        if let Some(dir) = &command.working_dir {
            println!("Working directory: {}", dir.display());
        }
    }
    Ok(())
}

async fn supervise(
    launches: Vec<ResolvedLaunch>,
    runner: &RunnerConfig,
    options: SupervisorOptions,
) -> Result<(StopReason, RunSummary)> {
    // Installed before any child exists so an early Ctrl-C is not lost
    let interrupts = listen_for_interrupts()?;

    let supervisor = Supervisor::launch(launches, runner, options, TerminalSink::stdio());
    if supervisor.launched() == 0 {
        println!("{}", "No services started.".yellow());
        return Ok((StopReason::AllExited, supervisor.finish().await));
    }

    info!("Supervising {} service(s)", supervisor.launched());

    let reason = supervisor
        .run_until_interrupted(|| {
            let interrupts = Arc::clone(&interrupts);
            async move { interrupts.notified().await }
        })
        .await;

    if reason == StopReason::Interrupted {
        println!("\n{}", "Stopping all services...".yellow());
    }

    Ok((reason, supervisor.finish().await))
}

/// Forward every SIGINT to a [`Notify`] for the lifetime of the runtime
#[cfg(unix)]
fn listen_for_interrupts() -> Result<Arc<Notify>> {
    use tokio::signal::unix::{SignalKind, signal};

    let notify = Arc::new(Notify::new());
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to install Ctrl-C handler")?;

    let tx = Arc::clone(&notify);
    tokio::spawn(async move {
        while sigint.recv().await.is_some() {
            tx.notify_one();
        }
    });

    Ok(notify)
}

#[cfg(not(unix))]
fn listen_for_interrupts() -> Result<Arc<Notify>> {
    let notify = Arc::new(Notify::new());

    let tx = Arc::clone(&notify);
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            tx.notify_one();
        }
    });

    Ok(notify)
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn services() -> Vec<ServiceDescriptor> {
        vec![
            ServiceDescriptor::new("api", "/srv/api")
                .with_command("start", "node .")
                .with_command("dev", "nodemon ."),
            ServiceDescriptor::new("docs", "/srv/docs"),
            ServiceDescriptor::new("web", "/srv/web").with_command("start", "vite"),
        ]
    }

    #[test]
    fn test_resolve_launches_skips_unrunnable_services() {
        let services = services();
        let selected: Vec<&ServiceDescriptor> = services.iter().collect();

        let prompt = Prompt::new(Cursor::new(""), Vec::new());
        let mut chooser = ScriptChooser::new([("api".to_string(), "dev".to_string())], prompt);

        let launches = resolve_launches(&selected, &mut chooser);
        let resolved: Vec<(&str, &str)> = launches
            .iter()
            .map(|l| (l.service_name(), l.command.as_str()))
            .collect();

        assert_eq!(resolved, vec![("api", "dev"), ("web", "start")]);
    }

    #[test]
    fn test_resolve_launches_drops_invalid_answer() {
        let services = services();
        let selected = vec![&services[0]];

        let prompt = Prompt::new(Cursor::new("7\n"), Vec::new());
        let mut chooser = ScriptChooser::new(Vec::new(), prompt);

        assert!(resolve_launches(&selected, &mut chooser).is_empty());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("database"), "Database");
        assert_eq!(capitalize(""), "");
    }
}
