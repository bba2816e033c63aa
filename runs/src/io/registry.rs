//! Scoped handle on the persisted registry.
//!
//! A [`Registry`] is opened at the start of an operation, mutated in memory,
//! and either [`Registry::commit`]ted or dropped. Dropping (or
//! [`Registry::discard`]) never writes, so a declined confirmation or an error
//! halfway through a mutation leaves the file untouched.
//!
//! There is no locking: two concurrent invocations each load the file and the
//! last one to commit wins.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::io::tree_store::{load_tree, write_tree};
use crate::tree::Tree;

#[derive(Debug)]
pub struct Registry {
    path: PathBuf,
    tree: Tree,
    modified: bool,
}

impl Registry {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            tree: load_tree(path)?,
            modified: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        self.modified = true;
        &mut self.tree
    }

    /// Write the tree back if it was borrowed mutably.
    pub fn commit(self) -> Result<()> {
        if !self.modified {
            debug!(path = %self.path.display(), "registry unchanged, skipping write");
            return Ok(());
        }
        write_tree(&self.path, &self.tree)
    }

    pub fn discard(self) {
        debug!(path = %self.path.display(), modified = self.modified, "registry discarded");
    }
}
