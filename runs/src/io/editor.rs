//! Free-text input through the user's editor.

use std::fs;
use std::io::Write;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::debug;

use crate::error::RegistryError;

pub trait Editor {
    /// Let the user edit `initial` below a `prompt` line; returns the edited text.
    fn edit(&self, prompt: &str, initial: &str) -> Result<String>;
}

/// Launches `$VISUAL`, then `$EDITOR`, then `vi` on a temp file.
#[derive(Debug, Clone, Default)]
pub struct ExternalEditor {
    program: Option<String>,
}

impl ExternalEditor {
    pub fn from_env() -> Self {
        let program = std::env::var("VISUAL")
            .ok()
            .or_else(|| std::env::var("EDITOR").ok())
            .filter(|p| !p.trim().is_empty());
        Self { program }
    }

    fn program(&self) -> &str {
        self.program.as_deref().unwrap_or("vi")
    }
}

impl Editor for ExternalEditor {
    fn edit(&self, prompt: &str, initial: &str) -> Result<String> {
        let mut file = tempfile::Builder::new()
            .prefix("runs-")
            .suffix(".txt")
            .tempfile()
            .context("create editor temp file")?;
        write!(file, "{}", compose(prompt, initial)).context("write editor temp file")?;
        file.flush().context("flush editor temp file")?;

        // `$EDITOR` may carry arguments, e.g. `code --wait`.
        let mut parts = self.program().split_whitespace();
        let program = parts.next().unwrap_or("vi");
        debug!(program, "launching editor");
        let status = Command::new(program)
            .args(parts)
            .arg(file.path())
            .status()
            .map_err(|err| RegistryError::external(program, err.to_string()))?;
        if !status.success() {
            return Err(RegistryError::external(program, format!("exited with {status}")).into());
        }

        let edited = fs::read_to_string(file.path()).context("read editor temp file")?;
        Ok(strip_prompt(prompt, &edited))
    }
}

fn compose(prompt: &str, initial: &str) -> String {
    format!("{prompt}\n{initial}")
}

/// Text after the first line equal to `prompt`, trimmed. Without the prompt
/// line the whole buffer counts.
fn strip_prompt(prompt: &str, edited: &str) -> String {
    match edited.split_once(&format!("{prompt}\n")) {
        Some((_, body)) => body.trim().to_string(),
        None => edited.trim().to_string(),
    }
}
