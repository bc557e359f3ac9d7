pub mod parser;
pub mod prompt;

pub use parser::parse_script_choice;
pub use prompt::{Prompt, ScriptChooser};
