use colored::Colorize;
use service_runner_core::supervisor::ProcessState;
use service_runner_core::{ConsoleEvent, ConsoleSink, StreamKind};
use std::io::{self, Write};
use tracing::debug;

/// Prints supervisor events with a `[service]` label per line.
///
/// Child stdout goes to `out`; child stderr and launch failures go to `err`.
pub struct TerminalSink<O, E> {
    out: O,
    err: E,
}

impl TerminalSink<io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> TerminalSink<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    fn render(&mut self, event: &ConsoleEvent) -> io::Result<()> {
        match event {
            ConsoleEvent::Started { service, command, pid } => {
                let pid = pid.map(|p| format!(" (pid {p})")).unwrap_or_default();
                writeln!(
                    self.out,
                    "{}",
                    format!("✓ Service {service} started with '{command}'{pid}").green()
                )
            }
            ConsoleEvent::Output {
                service,
                stream: StreamKind::Stdout,
                line,
            } => writeln!(self.out, "{} {}", format!("[{service}]").cyan(), line),
            ConsoleEvent::Output {
                service,
                stream: StreamKind::Stderr,
                line,
            } => writeln!(self.err, "{} {}", format!("[{service}]").red(), line),
            ConsoleEvent::Exited { service, state } => {
                let message = match state {
                    ProcessState::Killed => format!("✓ Service {service} stopped").green(),
                    ProcessState::Exited(Some(code)) => {
                        format!("[{service}] Process ended with code {code}").yellow()
                    }
                    ProcessState::Exited(None) | ProcessState::Running => {
                        format!("[{service}] Process ended").yellow()
                    }
                };
                writeln!(self.out, "{message}")
            }
            ConsoleEvent::SpawnFailed {
                service,
                command,
                error,
            } => writeln!(
                self.err,
                "{}",
                format!("✗ Failed to start {service} with '{command}': {error}").red()
            ),
            ConsoleEvent::Launched { running: 0, .. } => Ok(()),
            ConsoleEvent::Launched { .. } => {
                writeln!(self.out, "\n{}", "Services started successfully.".bold().green())?;
                writeln!(self.out, "{}", "Press Ctrl+C to stop all services.".yellow())
            }
        }
    }
}

impl<O, E> ConsoleSink for TerminalSink<O, E>
where
    O: Write + Send + 'static,
    E: Write + Send + 'static,
{
    fn write(&mut self, event: &ConsoleEvent) {
        // A closed terminal must not take the supervisor down with it
        if let Err(e) = self.render(event) {
            debug!(service = ?event.service(), "Console write failed: {}", e);
        }
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
        let _ = self.err.flush();
    }
}
