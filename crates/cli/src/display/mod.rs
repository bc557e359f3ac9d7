pub mod console_sink;
pub mod formatter;

pub use console_sink::TerminalSink;
pub use formatter::{
    format_run_summary, format_service_listing, print_run_summary, print_service_listing,
};
