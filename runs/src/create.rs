//! Orchestration for `runs new`.

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::context::{Collaborators, Workspace, kill_session_best_effort};
use crate::core::command::build_command;
use crate::core::mutation;
use crate::core::path::RunPath;
use crate::core::types::RunMetadata;
use crate::io::prompt::require;

pub const DIRTY_PROMPT: &str = "Repo is dirty. You should commit before run. Run anyway?";
pub const DESCRIPTION_PROMPT: &str =
    "Edit the description of this run: (Do not edit the line or above.)";

/// Parameters for a new run.
#[derive(Debug, Clone)]
pub struct NewRun {
    pub path: RunPath,
    /// Command as typed by the user.
    pub command: String,
    /// When `None`, the editor collects one.
    pub description: Option<String>,
}

/// What `runs new` recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRunOutcome {
    pub path: RunPath,
    pub full_command: String,
    pub description: String,
    /// Runs removed because they sat at (or under) the new path.
    pub replaced: Vec<RunPath>,
}

/// Create a run: check the repo, resolve overwrites, start the session, and
/// record the metadata.
///
/// Nothing is written to the registry unless every step succeeds. A failed
/// session start leaves freshly created aux directories behind.
#[instrument(skip_all, fields(path = %request.path))]
pub fn new_run(
    ws: &Workspace,
    collab: Collaborators<'_>,
    request: NewRun,
) -> Result<NewRunOutcome> {
    let path = request.path;
    if collab.vcs.is_dirty().context("check repository state")? {
        require(collab.confirm, DIRTY_PROMPT)?;
    }

    let full_command = build_command(
        &ws.config.prefix,
        &ws.config.flags,
        &request.command,
        &path,
    )?;

    let mut registry = ws.open_registry()?;
    let target = registry.tree().resolve(&path);
    let overwrite = target.is_some();
    let existing: Vec<RunPath> = match target {
        Some(id) => {
            require(
                collab.confirm,
                &format!("{path} already exists. Overwrite?"),
            )?;
            let tree = registry.tree();
            tree.runs_under(id)
                .into_iter()
                .filter_map(|run| tree.path_of(run))
                .collect()
        }
        None => Vec::new(),
    };

    let description = match request.description {
        Some(description) => description,
        None => collab
            .editor
            .edit(DESCRIPTION_PROMPT, "")
            .context("collect description")?,
    };
    let commit = collab.vcs.current_commit().context("read current commit")?;

    let aux = ws.aux_dirs();
    for old in &existing {
        kill_session_best_effort(collab.sessions, old);
        aux.remove(old)?;
    }
    aux.create(&path)?;
    collab
        .sessions
        .new_session(&path.to_string(), &description, &full_command)
        .context("start session")?;

    let metadata = RunMetadata {
        full_command: full_command.clone(),
        commit,
        datetime: now_iso(),
        description: description.clone(),
        input_command: request.command,
    };
    let (_, replaced) = mutation::create(registry.tree_mut(), &path, metadata, |_| overwrite)?;
    registry.commit()?;

    info!(%path, replaced = replaced.len(), "run recorded");
    Ok(NewRunOutcome {
        path,
        full_command,
        description,
        replaced,
    })
}

/// Local time as ISO-8601 with microseconds and no offset.
pub fn now_iso() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}
