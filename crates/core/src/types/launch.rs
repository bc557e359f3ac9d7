use super::ServiceDescriptor;

/// A service paired with the one runnable command chosen for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLaunch {
    pub service: ServiceDescriptor,
    pub command: String,
}

impl ResolvedLaunch {
    pub fn new(service: ServiceDescriptor, command: impl Into<String>) -> Self {
        Self {
            service,
            command: command.into(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service.name
    }

    pub fn invocation(&self) -> Option<&str> {
        self.service.invocation(&self.command)
    }
}
