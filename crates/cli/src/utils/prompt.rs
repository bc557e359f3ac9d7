use service_runner_core::{Disambiguator, ServiceDescriptor};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Line-based question/answer over any reader and writer
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl Prompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` and read one line; `None` once input is exhausted
    pub fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Ok(None);
        }
        Ok(Some(answer.trim_end_matches(['\n', '\r']).to_string()))
    }

    pub fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }
}

/// Answers disambiguation from `--script` choices first, then by asking
pub struct ScriptChooser<R, W> {
    answers: HashMap<String, String>,
    prompt: Prompt<R, W>,
}

impl<R: BufRead, W: Write> ScriptChooser<R, W> {
    pub fn new(answers: impl IntoIterator<Item = (String, String)>, prompt: Prompt<R, W>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            prompt,
        }
    }

    fn ask(&mut self, service: &ServiceDescriptor, commands: &[&str]) -> io::Result<Option<String>> {
        self.prompt
            .say(&format!("\nAvailable scripts for {}:", service.name))?;
        for (i, command) in commands.iter().enumerate() {
            let invocation = service.invocation(command).unwrap_or_default();
            self.prompt
                .say(&format!("{}. {}: {}", i + 1, command, invocation))?;
        }
        self.prompt.ask(&format!(
            "Select a script for {} (1-{}): ",
            service.name,
            commands.len()
        ))
    }
}

impl<R: BufRead, W: Write> Disambiguator for ScriptChooser<R, W> {
    fn choose(&mut self, service: &ServiceDescriptor, commands: &[&str]) -> Option<String> {
        if let Some(answer) = self.answers.get(&service.name) {
            debug!(service = %service.name, "Using --script choice '{}'", answer);
            return Some(answer.clone());
        }

        match self.ask(service, commands) {
            Ok(answer) => answer,
            Err(e) => {
                debug!(service = %service.name, "Prompt failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn service() -> ServiceDescriptor {
        ServiceDescriptor::new("api", "/srv/api")
            .with_command("start", "node .")
            .with_command("dev", "nodemon .")
    }

    #[test]
    fn test_ask_reads_one_line() {
        let mut out = Vec::new();
        let mut prompt = Prompt::new(Cursor::new("1,2\r\nnext\n"), &mut out);

        assert_eq!(prompt.ask("Pick: ").unwrap(), Some("1,2".to_string()));
        assert_eq!(prompt.ask("Again: ").unwrap(), Some("next".to_string()));
        assert_eq!(prompt.ask("Done: ").unwrap(), None);
        drop(prompt);
        assert_eq!(String::from_utf8(out).unwrap(), "Pick: Again: Done: ");
    }

    #[test]
    fn test_scripted_answer_skips_prompt() {
        let mut out = Vec::new();
        let prompt = Prompt::new(Cursor::new(""), &mut out);
        let mut chooser = ScriptChooser::new([("api".to_string(), "dev".to_string())], prompt);

        assert_eq!(chooser.choose(&service(), &["start", "dev"]), Some("dev".to_string()));
        drop(chooser);
        assert!(out.is_empty());
    }

    #[test]
    fn test_interactive_answer_lists_scripts() {
        let mut out = Vec::new();
        let prompt = Prompt::new(Cursor::new("2\n"), &mut out);
        let mut chooser = ScriptChooser::new(Vec::new(), prompt);

        assert_eq!(chooser.choose(&service(), &["start", "dev"]), Some("2".to_string()));
        drop(chooser);

        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Available scripts for api:"));
        assert!(shown.contains("1. start: node ."));
        assert!(shown.contains("2. dev: nodemon ."));
        assert!(shown.contains("Select a script for api (1-2): "));
    }

    #[test]
    fn test_exhausted_input_gives_no_answer() {
        let prompt = Prompt::new(Cursor::new(""), Vec::new());
        let mut chooser = ScriptChooser::new(Vec::new(), prompt);
        assert_eq!(chooser.choose(&service(), &["start", "dev"]), None);
    }
}
