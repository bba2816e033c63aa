//! Git adapter: the version-control probe consumed by `runs new`.
//!
//! The registry only needs two facts from git, so we keep a small, explicit
//! wrapper around `git` subprocess calls behind the [`VersionControl`] trait.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::{debug, instrument, warn};

use crate::error::RegistryError;
use crate::io::process::run_command_with_timeout;

/// Version-control facts recorded with each run.
pub trait VersionControl {
    /// True if the worktree has uncommitted or untracked changes outside the
    /// registry's own state.
    fn is_dirty(&self) -> Result<bool>;
    /// Commit currently checked out.
    fn current_commit(&self) -> Result<String>;
}

/// Parsed `git status --porcelain` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// 2-letter XY code, or "??" for untracked.
    pub code: String,
    /// Path for the changed file.
    pub path: String,
}

/// Wrapper for executing git commands in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
    timeout: Duration,
    ignored_prefixes: Vec<String>,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            workdir: workdir.into(),
            timeout,
            ignored_prefixes: Vec::new(),
        }
    }

    /// Status entries under any of `prefixes` don't make the worktree dirty.
    pub fn ignoring(mut self, prefixes: Vec<String>) -> Self {
        self.ignored_prefixes = prefixes;
        self
    }

    /// Get status entries (including untracked) in porcelain format.
    pub fn status_porcelain(&self) -> Result<Vec<StatusEntry>> {
        let out = self.run_capture(&["status", "--porcelain=v1", "-uall"])?;
        let mut entries = Vec::new();
        for line in out.lines() {
            if line.trim().is_empty() {
                continue;
            }
            entries.push(parse_status_line(line)?);
        }
        Ok(entries)
    }

    fn run_capture(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.workdir);
        let output = run_command_with_timeout(cmd, self.timeout)
            .map_err(|err| RegistryError::external("git", format!("{err:#}")))?;
        if !output.success() {
            return Err(RegistryError::external(
                format!("git {}", args.join(" ")),
                if output.timed_out {
                    "timed out".to_string()
                } else {
                    output.stderr_text()
                },
            )
            .into());
        }
        Ok(output.stdout_text())
    }
}

impl VersionControl for Git {
    #[instrument(skip_all)]
    fn is_dirty(&self) -> Result<bool> {
        let changed = self
            .status_porcelain()?
            .into_iter()
            .filter(|entry| {
                !self
                    .ignored_prefixes
                    .iter()
                    .any(|prefix| entry.path.starts_with(prefix.as_str()))
            })
            .count();
        if changed == 0 {
            debug!("worktree is clean");
            return Ok(false);
        }
        warn!(changed, "worktree not clean");
        Ok(true)
    }

    #[instrument(skip_all)]
    fn current_commit(&self) -> Result<String> {
        let out = self.run_capture(&["rev-parse", "HEAD"])?;
        let sha = out.trim().to_string();
        debug!(commit = %sha, "current commit");
        Ok(sha)
    }
}

fn parse_status_line(line: &str) -> Result<StatusEntry> {
    if let Some(path) = line.strip_prefix("?? ") {
        return Ok(StatusEntry {
            code: "??".to_string(),
            path: path.trim().to_string(),
        });
    }
    if line.len() < 4 {
        return Err(anyhow!("unexpected porcelain line: '{line}'"));
    }
    let code = line[..2].to_string();
    let mut path = line[3..].trim().to_string();
    if let Some((_, new)) = path.split_once("->") {
        path = new.trim().to_string();
    }
    Ok(StatusEntry { code, path })
}
