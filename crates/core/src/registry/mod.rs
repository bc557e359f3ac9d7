//! Service discovery
//!
//! Scans the workspace's services directory and turns every sub-directory into a
//! [`ServiceDescriptor`]. Discovery is lazy and keeps directory-listing order, so
//! the index an operator sees in the listing is the index they type back.

mod manifest;

pub use manifest::Manifest;

use crate::config::{AuxiliaryFilter, Config};
use crate::error::{Error, Result};
use crate::types::{ManifestStatus, ServiceDescriptor, default_description};
use std::fs::{DirEntry, ReadDir};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Start a discovery pass over the services directory of `workspace_root`.
///
/// Fails with [`Error::WorkspaceNotFound`] when the services directory is missing;
/// every per-service problem degrades into the descriptor instead.
pub fn discover(workspace_root: &Path, config: &Config) -> Result<Discovery> {
    let services_dir = config.services_path(workspace_root);
    if !services_dir.is_dir() {
        return Err(Error::WorkspaceNotFound(services_dir));
    }

    debug!("Discovering services in {}", services_dir.display());
    let entries = std::fs::read_dir(&services_dir)?;

    Ok(Discovery {
        entries,
        services_dir,
        manifest_file: config.manifest_file.clone(),
        auxiliary: config.auxiliary.clone(),
    })
}

/// One-shot iterator over the services of a workspace
#[derive(Debug)]
pub struct Discovery {
    entries: ReadDir,
    services_dir: PathBuf,
    manifest_file: String,
    auxiliary: AuxiliaryFilter,
}

impl Discovery {
    fn is_service_dir(entry: &DirEntry) -> bool {
        match entry.file_type() {
            Ok(ft) if ft.is_dir() => true,
            // Follow symlinked service directories
            Ok(ft) if ft.is_symlink() => entry.path().is_dir(),
            _ => false,
        }
    }
}

impl Iterator for Discovery {
    type Item = ServiceDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", self.services_dir.display(), e);
                    continue;
                }
            };

            if !Self::is_service_dir(&entry) {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            return Some(describe_service(
                &name,
                &entry.path(),
                &self.manifest_file,
                &self.auxiliary,
            ));
        }
    }
}

/// Build the descriptor for one service directory
pub fn describe_service(
    name: &str,
    path: &Path,
    manifest_file: &str,
    auxiliary: &AuxiliaryFilter,
) -> ServiceDescriptor {
    let manifest_path = path.join(manifest_file);
    let mut service = ServiceDescriptor::new(name, path);

    match Manifest::load(&manifest_path) {
        Ok(Some(manifest)) => {
            if let Some(description) = manifest.description() {
                service.description = description.to_string();
            }
            service.runnable_commands = manifest
                .scripts
                .into_iter()
                .filter(|(command, _)| auxiliary.is_runnable(command))
                .collect();
            debug!(
                service = name,
                "Found {} runnable command(s)",
                service.runnable_commands.len()
            );
        }
        Ok(None) => {
            debug!(service = name, "No {} found", manifest_file);
            service.description = format!("{} (no {manifest_file})", default_description(name));
            service.manifest = ManifestStatus::Missing;
        }
        Err(e) => {
            warn!(service = name, "Ignoring unreadable manifest: {}", e);
            service.description =
                format!("{} (error in {manifest_file})", default_description(name));
            service.manifest = ManifestStatus::Malformed(e.to_string());
        }
    }

    service
}
