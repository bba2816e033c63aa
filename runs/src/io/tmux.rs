//! Tmux sessions, one per run, named after the run path.
//!
//! [`SessionManager`] decouples orchestration from tmux. Tests use a recording
//! implementation that never spawns processes.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, instrument};

use crate::error::RegistryError;
use crate::io::process::{CommandOutput, run_command_with_timeout};

pub trait SessionManager {
    /// Start a detached session for `path` and send `command` to it.
    fn new_session(&self, path: &str, window_name: &str, command: &str) -> Result<()>;
    /// Kill the session for `path`. A missing session is not an error.
    fn kill(&self, path: &str) -> Result<()>;
    /// Rename the session for `path`. A missing session is not an error.
    fn rename(&self, path: &str, new_name: &str) -> Result<()>;
}

/// [`SessionManager`] backed by the `tmux` binary.
#[derive(Debug, Clone)]
pub struct Tmux {
    /// Directory the session `cd`s into before running the command.
    workdir: PathBuf,
    timeout: Duration,
}

impl Tmux {
    pub fn new(workdir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            workdir: workdir.into(),
            timeout,
        }
    }

    fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        let mut cmd = Command::new("tmux");
        cmd.args(args);
        run_command_with_timeout(cmd, self.timeout)
            .map_err(|err| RegistryError::external("tmux", format!("{err:#}")).into())
    }

    fn run_checked(&self, args: &[&str]) -> Result<()> {
        let output = self.run(args)?;
        if !output.success() {
            return Err(RegistryError::external(
                format!("tmux {}", args.join(" ")),
                output.stderr_text(),
            )
            .into());
        }
        Ok(())
    }
}

impl SessionManager for Tmux {
    #[instrument(skip(self, command))]
    fn new_session(&self, path: &str, window_name: &str, command: &str) -> Result<()> {
        self.kill(path)?;
        self.run_checked(&["new", "-d", "-s", path, "-n", window_name])?;
        let cd = format!("cd {}", self.workdir.display());
        for keys in [cd.as_str(), command] {
            self.run_checked(&["send-keys", "-t", path, keys, "Enter"])?;
        }
        info!(session = path, "session started");
        Ok(())
    }

    #[instrument(skip(self))]
    fn kill(&self, path: &str) -> Result<()> {
        let output = self.run(&["kill-session", "-t", path])?;
        if !output.success() {
            debug!(stderr = %output.stderr_text(), "no session to kill");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    fn rename(&self, path: &str, new_name: &str) -> Result<()> {
        let output = self.run(&["rename-session", "-t", path, new_name])?;
        if !output.success() {
            debug!(stderr = %output.stderr_text(), "no session to rename");
        }
        Ok(())
    }
}
