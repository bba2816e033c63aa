//! Initialization helpers for `.runs/` scaffolding.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::info;

use super::config::{RunsConfig, write_config};
use super::tree_store::write_tree;
use crate::tree::Tree;

/// All canonical paths within `.runs/` for a project root.
#[derive(Debug, Clone)]
pub struct RunsPaths {
    pub root: PathBuf,
    pub runs_dir: PathBuf,
    pub registry_path: PathBuf,
    pub config_path: PathBuf,
}

impl RunsPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let runs_dir = root.join(".runs");
        Self {
            root: root.clone(),
            runs_dir: runs_dir.clone(),
            registry_path: runs_dir.join("registry.json"),
            config_path: runs_dir.join("config.toml"),
        }
    }

    /// Resolve a configured (possibly relative) directory against the project root.
    pub fn resolve(&self, dir: &str) -> PathBuf {
        let path = Path::new(dir);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Options for `init_runs`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// If true, overwrite an existing registry and config.
    pub force: bool,
}

/// Create `.runs/` with an empty registry and a default config.
///
/// Fails if the registry already exists unless `options.force` is set. An
/// existing config is kept unless forced.
pub fn init_runs(root: &Path, options: &InitOptions) -> Result<RunsPaths> {
    let paths = RunsPaths::new(root);
    if paths.runs_dir.exists() && !paths.runs_dir.is_dir() {
        return Err(anyhow!("runs init: .runs exists but is not a directory"));
    }
    if paths.registry_path.exists() && !options.force {
        return Err(anyhow!(
            "runs init: {} already exists (use --force to overwrite)",
            paths.registry_path.display()
        ));
    }

    fs::create_dir_all(&paths.runs_dir)
        .with_context(|| format!("create directory {}", paths.runs_dir.display()))?;
    write_tree(&paths.registry_path, &Tree::new())?;
    if options.force || !paths.config_path.exists() {
        write_config(&paths.config_path, &RunsConfig::default())?;
    }
    info!(root = %paths.root.display(), "initialized .runs");
    Ok(paths)
}
