use colored::Colorize;
use service_runner_core::{RunSummary, ServiceDescriptor, StopReason};
use service_runner_core::supervisor::ProcessState;
use std::fmt::Write;

/// Numbered listing shown before selection; indices are 1-based
pub fn format_service_listing(services: &[ServiceDescriptor]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Available services:".yellow());

    for (index, service) in services.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} - {}",
            index + 1,
            service.name.bold(),
            service.description
        );

        if service.has_runnable_commands() {
            let _ = writeln!(
                out,
                "   {} Available scripts: {}",
                "✓".green(),
                service.command_names().join(", ")
            );
        } else {
            let _ = writeln!(out, "   {} No scripts found to run", "✗".red());
        }
    }

    out
}

pub fn print_service_listing(services: &[ServiceDescriptor]) {
    print!("\n{}", format_service_listing(services));
}

/// Per-service outcome lines printed once the supervisor has stopped
pub fn format_run_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    for outcome in &summary.outcomes {
        let mark = match outcome.state {
            ProcessState::Killed | ProcessState::Exited(Some(0)) => "✓".green(),
            _ => "✗".red(),
        };
        let _ = writeln!(out, "   {} {}: {}", mark, outcome.service_name, outcome.state);
    }
    for failure in &summary.failures {
        let _ = writeln!(
            out,
            "   {} {}: failed to start ({})",
            "✗".red(),
            failure.service_name,
            failure.error
        );
    }
    for service in &summary.unfinished {
        let _ = writeln!(out, "   {} {}: still running", "✗".red(), service);
    }

    out
}

pub fn print_run_summary(summary: &RunSummary, reason: StopReason) {
    println!("\n{}", "Summary:".yellow());
    print!("{}", format_run_summary(summary));

    if !summary.unfinished.is_empty() {
        println!("{}", "Some services did not stop before the shutdown timeout.".red());
        return;
    }

    match reason {
        StopReason::Interrupted => println!("{}", "All services stopped!".bold().green()),
        StopReason::AllExited => println!("{}", "All services have exited.".bold().yellow()),
    }
}
