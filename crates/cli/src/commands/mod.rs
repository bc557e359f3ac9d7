pub mod init;
pub mod list;
pub mod start;

pub use init::init_command;
pub use list::list_command;
pub use start::{StartOptions, start_command};
