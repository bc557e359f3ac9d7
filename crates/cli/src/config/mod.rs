pub mod templates;
pub mod workspace;

pub use templates::default_config_template;
pub use workspace::Workspace;
