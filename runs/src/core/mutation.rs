//! Structural mutations: create, move, remove (with upward pruning), lookup.
//!
//! All operations keep the tree free of dead directories: every path that
//! detaches a node ends with [`Tree::prune_upward`] from the former parent.

use tracing::debug;

use crate::core::path::RunPath;
use crate::core::types::{MetadataKey, RunMetadata};
use crate::error::RegistryError;
use crate::tree::{NodeId, Tree};

/// Create a run at `path`, creating intermediate directories.
///
/// If something already exists at `path`, `overwrite` decides: `false` aborts
/// with `ConfirmationDeclined` and no mutation; `true` removes the existing
/// subtree first. Returns the new node and the runs that were replaced.
pub fn create(
    tree: &mut Tree,
    path: &RunPath,
    metadata: RunMetadata,
    overwrite: impl FnOnce(&RunPath) -> bool,
) -> Result<(NodeId, Vec<RunPath>), RegistryError> {
    let mut replaced = Vec::new();
    if tree.resolve(path).is_some() {
        if !overwrite(path) {
            return Err(RegistryError::declined(format!(
                "{path} already exists. Overwrite?"
            )));
        }
        replaced = remove(tree, path)?;
    }
    let parent = tree.ensure_dirs(path.parent_segments());
    let id = tree.insert(parent, path.head(), Some(metadata))?;
    debug!(%path, replaced = replaced.len(), "run created");
    Ok((id, replaced))
}

/// Move the node at `source` (with its subtree) to `dest`.
///
/// The destination's parent chain is created as needed and never pruned; the
/// source's old parent chain is pruned. Returns `(old, new)` paths of every
/// run that moved.
pub fn move_node(
    tree: &mut Tree,
    source: &RunPath,
    dest: &RunPath,
) -> Result<Vec<(RunPath, RunPath)>, RegistryError> {
    let id = tree
        .resolve(source)
        .ok_or_else(|| RegistryError::not_found(source))?;
    if source == dest {
        return Ok(Vec::new());
    }
    if dest.starts_with(source) {
        return Err(RegistryError::InvalidMove {
            source_path: source.to_string(),
            dest: dest.to_string(),
            reason: "destination is inside the source".to_string(),
        });
    }
    if tree.resolve(dest).is_some() {
        return Err(RegistryError::PathExists {
            path: dest.to_string(),
        });
    }

    let before: Vec<(NodeId, RunPath)> = tree
        .runs_under(id)
        .into_iter()
        .filter_map(|run| tree.path_of(run).map(|path| (run, path)))
        .collect();

    let old_parent = tree
        .detach(id)
        .ok_or_else(|| RegistryError::not_found(source))?;
    let new_parent = tree.ensure_dirs(dest.parent_segments());
    tree.attach(id, new_parent, dest.head())?;
    let pruned = tree.prune_upward(old_parent);
    debug!(%source, %dest, pruned, "node moved");

    Ok(before
        .into_iter()
        .filter_map(|(run, old)| tree.path_of(run).map(|new| (old, new)))
        .collect())
}

/// Remove the node at `path` and its subtree. Returns the removed run paths.
pub fn remove(tree: &mut Tree, path: &RunPath) -> Result<Vec<RunPath>, RegistryError> {
    let id = tree
        .resolve(path)
        .ok_or_else(|| RegistryError::not_found(path))?;
    let removed: Vec<RunPath> = tree
        .runs_under(id)
        .into_iter()
        .filter_map(|run| tree.path_of(run))
        .collect();
    let parent = tree
        .detach(id)
        .ok_or_else(|| RegistryError::not_found(path))?;
    tree.free(id);
    let pruned = tree.prune_upward(parent);
    debug!(%path, removed = removed.len(), pruned, "node removed");
    Ok(removed)
}

/// Remove only the run at `path`, keeping any runs recorded below it.
///
/// A run without children is detached like [`remove`]. A run with children
/// loses its metadata and stays as a directory. Either way, dead ancestors
/// are pruned.
pub fn remove_run(tree: &mut Tree, path: &RunPath) -> Result<(), RegistryError> {
    let id = tree
        .resolve(path)
        .ok_or_else(|| RegistryError::not_found(path))?;
    if tree.node(id).children().is_empty() {
        remove(tree, path)?;
        return Ok(());
    }
    tree.take_metadata(id);
    let pruned = tree.prune_upward(id);
    debug!(%path, pruned, "run metadata cleared");
    Ok(())
}

/// Read one metadata field of the run at `path`.
///
/// `command` is the public name of `input_command`. Directories carry no
/// metadata, so every key is invalid for them.
pub fn lookup(tree: &Tree, path: &RunPath, key: &str) -> Result<String, RegistryError> {
    let id = tree
        .resolve(path)
        .ok_or_else(|| RegistryError::not_found(path))?;
    let metadata = tree.node(id).metadata();
    let parsed = key.parse::<MetadataKey>().ok();
    match (metadata, parsed) {
        (Some(metadata), Some(key)) => Ok(metadata.get(key).to_string()),
        (metadata, _) => Err(RegistryError::InvalidKey {
            path: path.to_string(),
            key: key.to_string(),
            valid: match metadata {
                Some(_) => MetadataKey::ALL.iter().map(ToString::to_string).collect(),
                None => Vec::new(),
            },
        }),
    }
}

/// Replace the description of the run at `path`.
pub fn set_description(
    tree: &mut Tree,
    path: &RunPath,
    description: String,
) -> Result<(), RegistryError> {
    let id = tree
        .resolve(path)
        .ok_or_else(|| RegistryError::not_found(path))?;
    let metadata = tree
        .metadata_mut(id)
        .ok_or_else(|| RegistryError::InvalidKey {
            path: path.to_string(),
            key: MetadataKey::Description.to_string(),
            valid: Vec::new(),
        })?;
    metadata.description = description;
    Ok(())
}
