use anyhow::{Context, Result};
use service_runner_core::ServiceDescriptor;

use crate::config::Workspace;
use crate::display::print_service_listing;

use super::start::discover_services;

pub fn list_command(workspace: &Workspace, json: bool) -> Result<()> {
    let services: Vec<ServiceDescriptor> = discover_services(workspace)?;

    if json {
        let output =
            serde_json::to_string_pretty(&services).context("Failed to serialize services")?;
        println!("{output}");
        return Ok(());
    }

    if services.is_empty() {
        println!(
            "No services found in {}",
            workspace.services_dir().display()
        );
        return Ok(());
    }

    print_service_listing(&services);
    Ok(())
}
