mod launch;
mod service;

pub use launch::ResolvedLaunch;
pub use service::{ManifestStatus, ServiceDescriptor};
pub(crate) use service::default_description;
