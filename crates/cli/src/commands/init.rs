use anyhow::{Context, Result};
use service_runner_core::config::CONFIG_FILE_NAMES;
use tracing::info;

use crate::config::{Workspace, default_config_template};

pub fn init_command(workspace: &Workspace, force: bool) -> Result<()> {
    let config_path = workspace.root.join(CONFIG_FILE_NAMES[0]);

    if config_path.exists() && !force {
        println!("❌ Config already exists at: {}", config_path.display());
        println!("   Use --force to overwrite");
        return Ok(());
    }

    default_config_template()
        .save_to_file(&config_path)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    info!("Created config: {}", config_path.display());

    println!("✅ Created config: {}", config_path.display());
    println!("\n📌 Services are discovered in '{}'", workspace.services_dir().display());
    println!("   Edit 'runner' to change how scripts are started");
    println!("   Remove 'precondition' if nothing has to run before the services");

    Ok(())
}
