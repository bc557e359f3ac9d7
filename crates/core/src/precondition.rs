//! One-shot commands run before any service starts (e.g. bringing a database up)

use crate::command::ServiceCommand;
use crate::config::PreconditionConfig;
use crate::error::{Error, Result};
use std::path::Path;
use tracing::{info, warn};

/// Run `precondition` in `workspace_root` with inherited stdio.
///
/// A non-zero exit is reported as an error; callers decide whether to go on.
pub fn run_precondition(precondition: &PreconditionConfig, workspace_root: &Path) -> Result<()> {
    let command = ServiceCommand::for_precondition(precondition).with_working_dir(workspace_root);
    let shell_cmd = command.to_shell_command();
    info!("Starting {}: {}", precondition.label, shell_cmd);

    let status = command
        .execute()
        .map_err(|e| Error::Other(format!("Failed to run '{shell_cmd}': {e}")))?;

    if status.success() {
        Ok(())
    } else {
        warn!("{} command exited with {}", precondition.label, status);
        Err(Error::Other(format!("'{shell_cmd}' exited with {status}")))
    }
}

/// Whether an answer to a yes/no prompt means yes (`y`, `yes`, `s`, `si`)
pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes" | "s" | "si"
    )
}
