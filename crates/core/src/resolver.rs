//! Script resolution
//!
//! Picks the single runnable command each selected service is started with.

use crate::selector::parse_index;
use crate::types::{ResolvedLaunch, ServiceDescriptor};
use tracing::{debug, warn};

/// Source of answers when a service has more than one runnable command.
///
/// Implementations return the raw answer: a 1-based index into `commands` or a
/// command name. `None` means no answer was given.
pub trait Disambiguator {
    fn choose(&mut self, service: &ServiceDescriptor, commands: &[&str]) -> Option<String>;
}

impl<F> Disambiguator for F
where
    F: FnMut(&ServiceDescriptor, &[&str]) -> Option<String>,
{
    fn choose(&mut self, service: &ServiceDescriptor, commands: &[&str]) -> Option<String> {
        self(service, commands)
    }
}

/// Outcome of resolving one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Launch(ResolvedLaunch),
    NoRunnableCommands,
    InvalidChoice { input: Option<String> },
}

impl Resolution {
    pub fn into_launch(self) -> Option<ResolvedLaunch> {
        match self {
            Resolution::Launch(launch) => Some(launch),
            _ => None,
        }
    }
}

pub fn resolve(service: &ServiceDescriptor, disambiguator: &mut dyn Disambiguator) -> Resolution {
    let commands = service.command_names();

    match commands.as_slice() {
        [] => Resolution::NoRunnableCommands,
        [only] => {
            debug!(service = %service.name, "Auto-selected '{}'", only);
            Resolution::Launch(ResolvedLaunch::new(service.clone(), *only))
        }
        _ => {
            let input = disambiguator.choose(service, &commands);
            match input.as_deref().and_then(|answer| match_choice(answer, &commands)) {
                Some(command) => Resolution::Launch(ResolvedLaunch::new(service.clone(), command)),
                None => Resolution::InvalidChoice { input },
            }
        }
    }
}

/// Why a selected service is not launched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoRunnableCommands,
    InvalidChoice { input: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub service_name: String,
    pub reason: SkipReason,
}

/// Launches in selection order plus the services left out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSelection {
    pub launches: Vec<ResolvedLaunch>,
    pub skipped: Vec<Skipped>,
}

/// Resolve every selected service; one that cannot run is skipped, never fatal
pub fn resolve_all<'a, I>(services: I, disambiguator: &mut dyn Disambiguator) -> ResolvedSelection
where
    I: IntoIterator<Item = &'a ServiceDescriptor>,
{
    let mut resolved = ResolvedSelection::default();

    for service in services {
        let reason = match resolve(service, disambiguator) {
            Resolution::Launch(launch) => {
                resolved.launches.push(launch);
                continue;
            }
            Resolution::NoRunnableCommands => {
                warn!(service = %service.name, "Service has no runnable commands, skipping");
                SkipReason::NoRunnableCommands
            }
            Resolution::InvalidChoice { input } => {
                warn!(
                    service = %service.name,
                    "Invalid command selection {:?}, skipping",
                    input.as_deref().unwrap_or_default()
                );
                SkipReason::InvalidChoice { input }
            }
        };

        resolved.skipped.push(Skipped {
            service_name: service.name.clone(),
            reason,
        });
    }

    resolved
}

fn match_choice<'c>(answer: &str, commands: &[&'c str]) -> Option<&'c str> {
    let answer = answer.trim();
    parse_index(answer, commands.len())
        .map(|i| commands[i])
        .or_else(|| commands.iter().copied().find(|c| *c == answer))
}
