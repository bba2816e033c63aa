//! Interactive yes/no confirmation.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use crate::error::RegistryError;

pub trait Confirm {
    /// Ask `prompt`; `true` means the user approved.
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Ask and turn a refusal into [`RegistryError::ConfirmationDeclined`].
pub fn require(confirm: &dyn Confirm, prompt: &str) -> Result<()> {
    if confirm.confirm(prompt)? {
        return Ok(());
    }
    Err(RegistryError::declined(prompt).into())
}

/// Approves everything (`--assume-yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Reads `y`/`n` answers from stdin; re-asks on anything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        let stdin = std::io::stdin();
        let mut stderr = std::io::stderr();
        ask(prompt, &mut stdin.lock(), &mut stderr)
    }
}

fn ask(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> Result<bool> {
    loop {
        write!(output, "{prompt} [y/n] ").context("write prompt")?;
        output.flush().context("flush prompt")?;
        let mut line = String::new();
        if input.read_line(&mut line).context("read answer")? == 0 {
            // EOF: treat a closed stdin as a refusal.
            return Ok(false);
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(output, "Please answer y or n.").context("write prompt")?,
        }
    }
}
