pub mod commands;
pub mod render;

use std::io::{BufRead, Write};

use clap::Parser;
use clap::error::ErrorKind;
use colored::Colorize;

use crate::cli::commands::{CommandLine, Outcome, execute};
use crate::domain::optical_model::optimizer::OpticalPathOptimizer;

const PROMPT: &str = "optimizer> ";

/// Line oriented operator shell on top of an [`OpticalPathOptimizer`].
///
/// A failing command prints its error and the shell keeps reading.
pub struct Shell {
    optimizer: OpticalPathOptimizer,
    interactive: bool,
}

impl Shell {
    pub fn new(optimizer: OpticalPathOptimizer, interactive: bool) -> Self {
        Self { optimizer, interactive }
    }

    pub fn optimizer(&self) -> &OpticalPathOptimizer {
        &self.optimizer
    }

    /// Parses and runs one line. Blank lines and `#` comments yield empty output.
    pub fn run_line(&self, line: &str) -> std::result::Result<Outcome, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Outcome::Output(String::new()));
        }

        let command = match CommandLine::try_parse_from(line.split_whitespace()) {
            Ok(parsed) => parsed.command,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                return Ok(Outcome::Output(e.to_string().trim_end().to_string()));
            }
            Err(e) => return Err(e.to_string().trim_end().to_string()),
        };

        log::debug!("Executing {:?}", command);
        execute(&self.optimizer, command).map_err(|e| {
            log::warn!("Command '{}' failed: {}", line, e);
            e.to_string()
        })
    }

    /// Reads commands from `input` until `exit` or end of input.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut out: W) -> std::io::Result<()> {
        self.prompt(&mut out)?;
        for line in input.lines() {
            match self.run_line(&line?) {
                Ok(Outcome::Exit) => break,
                Ok(Outcome::Output(text)) if text.is_empty() => {}
                Ok(Outcome::Output(text)) => writeln!(out, "{}", text)?,
                Err(message) => writeln!(out, "{} {}", "Error:".red().bold(), message)?,
            }
            self.prompt(&mut out)?;
        }
        out.flush()
    }

    fn prompt<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        if self.interactive {
            write!(out, "{}", PROMPT.cyan())?;
            out.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::network_dto::NetworkDto;
    use crate::domain::optical_model::config::OptimizerConfig;

    fn shell() -> Shell {
        let dto: NetworkDto = serde_json::from_str(
            r#"{"devices": [{"id": "A", "type": "ROADM", "ports": [{"number": 10, "type": "OMS"}]}], "links": []}"#,
        )
        .unwrap();
        Shell::new(OpticalPathOptimizer::from_network(&dto, OptimizerConfig::default()).unwrap(), false)
    }

    #[test]
    fn test_comments_and_blank_lines_are_ignored() {
        let shell = shell();
        assert_eq!(shell.run_line("   "), Ok(Outcome::Output(String::new())));
        assert_eq!(shell.run_line("# wdm-path-calc"), Ok(Outcome::Output(String::new())));
    }

    #[test]
    fn test_errors_do_not_stop_the_shell() {
        colored::control::set_override(false);
        let shell = shell();
        let input = "unknown-command\nwavelength-paths\nexit\nwavelength-paths\n";
        let mut out = Vec::new();
        shell.run(input.as_bytes(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Error:"), "Unexpected output {:?}", lines);
        assert_eq!(text.matches("No results.").count(), 1, "Input after exit must not run: {}", text);
    }

    #[test]
    fn test_help_is_output() {
        let shell = shell();
        let Ok(Outcome::Output(text)) = shell.run_line("help") else {
            panic!("help must print usage");
        };
        assert!(text.contains("wdm-path-calc"));
    }
}
