//! Orchestration for `runs rm`.

use anyhow::Result;
use tracing::{debug, info, instrument};

use crate::context::{Collaborators, Workspace, kill_session_best_effort, listing_prompt};
use crate::core::mutation;
use crate::core::path::RunPath;
use crate::core::pattern::Pattern;
use crate::core::query::descendants;
use crate::io::prompt::require;

/// Remove every run matched by `patterns` and not by `unless`.
///
/// Runs are removed one by one, deepest first, so an excluded run below a
/// removed one keeps its place in the tree. Returns the removed paths.
#[instrument(skip_all, fields(patterns = patterns.len(), unless = unless.len()))]
pub fn remove_runs(
    ws: &Workspace,
    collab: Collaborators<'_>,
    patterns: &[Pattern],
    unless: &[Pattern],
) -> Result<Vec<RunPath>> {
    let mut registry = ws.open_registry()?;
    let (targets, shared) = {
        let tree = registry.tree();
        let ids = descendants(tree, patterns, unless).require_runs()?;
        // Runs whose aux directories also hold a surviving sub-run.
        let shared: Vec<RunPath> = ids
            .iter()
            .filter(|&&id| tree.runs_under(id).iter().any(|run| !ids.contains(run)))
            .filter_map(|&id| tree.path_of(id))
            .collect();
        let targets: Vec<RunPath> = ids.into_iter().filter_map(|id| tree.path_of(id)).collect();
        (targets, shared)
    };
    if targets.is_empty() {
        registry.discard();
        return Ok(Vec::new());
    }
    require(
        collab.confirm,
        &listing_prompt("Runs to be removed:", &targets, "Continue?"),
    )?;

    let aux = ws.aux_dirs();
    for path in &targets {
        kill_session_best_effort(collab.sessions, path);
        if shared.contains(path) {
            debug!(%path, "keeping aux directories of surviving sub-runs");
            continue;
        }
        aux.remove(path)?;
    }
    let tree = registry.tree_mut();
    for path in targets.iter().rev() {
        mutation::remove_run(tree, path)?;
    }
    registry.commit()?;

    info!(removed = targets.len(), "runs removed");
    Ok(targets)
}
