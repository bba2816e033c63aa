//! Per-run auxiliary directories: `<root>/<dir_name>/<run path>`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::path::RunPath;

#[derive(Debug, Clone)]
pub struct AuxDirs {
    root: PathBuf,
    dir_names: Vec<String>,
}

impl AuxDirs {
    pub fn new(root: impl Into<PathBuf>, dir_names: Vec<String>) -> Self {
        Self {
            root: root.into(),
            dir_names,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// One directory per configured name for `path`.
    pub fn dirs_for(&self, path: &RunPath) -> Vec<PathBuf> {
        self.dir_names
            .iter()
            .map(|name| {
                path.segments()
                    .iter()
                    .fold(self.root.join(name), |dir, segment| dir.join(segment))
            })
            .collect()
    }

    pub fn create(&self, path: &RunPath) -> Result<()> {
        for dir in self.dirs_for(path) {
            fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
            debug!(dir = %dir.display(), "created run directory");
        }
        Ok(())
    }

    /// Remove the run's directories; missing ones are skipped.
    pub fn remove(&self, path: &RunPath) -> Result<()> {
        for dir in self.dirs_for(path) {
            match fs::remove_dir_all(&dir) {
                Ok(()) => debug!(dir = %dir.display(), "removed run directory"),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(err).with_context(|| format!("remove {}", dir.display()));
                }
            }
        }
        Ok(())
    }

    /// Move the run's directories from `source` to `dest`; missing ones are skipped.
    pub fn rename(&self, source: &RunPath, dest: &RunPath) -> Result<()> {
        for (from, to) in self.dirs_for(source).into_iter().zip(self.dirs_for(dest)) {
            if !from.exists() {
                continue;
            }
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
            fs::rename(&from, &to)
                .with_context(|| format!("move {} to {}", from.display(), to.display()))?;
            debug!(from = %from.display(), to = %to.display(), "moved run directory");
        }
        Ok(())
    }

    /// Delete the whole auxiliary tree (used by `killall`).
    pub fn remove_all(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("remove {}", self.root.display())),
        }
    }
}
