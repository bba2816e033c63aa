//! Per-invocation context shared by every command.
//!
//! [`Workspace`] is the project root with its loaded config; [`Collaborators`]
//! bundles the external tools a command may call. Both are built once in
//! `main` (or by a test) and passed down by reference.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

use crate::core::path::RunPath;
use crate::io::config::{RunsConfig, load_config};
use crate::io::dirs::AuxDirs;
use crate::io::editor::Editor;
use crate::io::git::VersionControl;
use crate::io::init::RunsPaths;
use crate::io::prompt::Confirm;
use crate::io::registry::Registry;
use crate::io::tmux::SessionManager;

#[derive(Debug, Clone)]
pub struct Workspace {
    pub paths: RunsPaths,
    pub config: RunsConfig,
}

impl Workspace {
    /// Load `.runs/config.toml` under `root` (defaults when missing).
    pub fn load(root: &Path) -> Result<Self> {
        let paths = RunsPaths::new(root);
        let config = load_config(&paths.config_path).context("load config.toml")?;
        Ok(Self { paths, config })
    }

    pub fn open_registry(&self) -> Result<Registry> {
        Registry::open(&self.paths.registry_path)
    }

    pub fn aux_dirs(&self) -> AuxDirs {
        AuxDirs::new(
            self.paths.resolve(&self.config.root),
            self.config.dir_names.clone(),
        )
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.config.command_timeout_secs)
    }

    /// Repo-relative prefixes holding registry state: `.runs/` and a relative
    /// aux root. Changes under them don't count as a dirty worktree.
    pub fn state_prefixes(&self) -> Vec<String> {
        let mut prefixes = vec![".runs/".to_string()];
        let aux = self.config.root.trim_start_matches("./").trim_end_matches('/');
        if !Path::new(aux).is_absolute() && !aux.starts_with(".runs/") {
            prefixes.push(format!("{aux}/"));
        }
        prefixes
    }
}

#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub sessions: &'a dyn SessionManager,
    pub vcs: &'a dyn VersionControl,
    pub confirm: &'a dyn Confirm,
    pub editor: &'a dyn Editor,
}

/// Kill the session for `path`, logging instead of failing.
pub fn kill_session_best_effort(sessions: &dyn SessionManager, path: &RunPath) {
    if let Err(err) = sessions.kill(&path.to_string()) {
        warn!(%path, err = %format!("{err:#}"), "failed to kill session");
    }
}

/// Rename the session for `old` to `new`, logging instead of failing.
pub fn rename_session_best_effort(sessions: &dyn SessionManager, old: &RunPath, new: &RunPath) {
    if let Err(err) = sessions.rename(&old.to_string(), &new.to_string()) {
        warn!(%old, %new, err = %format!("{err:#}"), "failed to rename session");
    }
}

/// Prompt listing `paths` between a heading and a question.
pub fn listing_prompt(heading: &str, paths: &[RunPath], question: &str) -> String {
    let mut lines = vec![heading.to_string()];
    lines.extend(paths.iter().map(ToString::to_string));
    lines.push(question.to_string());
    lines.join("\n")
}
