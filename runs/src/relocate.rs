//! Orchestration for `runs mv`.

use anyhow::Result;
use tracing::{info, instrument};

use crate::context::{
    Collaborators, Workspace, kill_session_best_effort, rename_session_best_effort,
};
use crate::core::mutation;
use crate::core::path::RunPath;
use crate::error::RegistryError;
use crate::io::prompt::require;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    /// `(old, new)` path of every run that moved.
    pub moved: Vec<(RunPath, RunPath)>,
    /// Runs that were at `dest` and got overwritten.
    pub replaced: Vec<RunPath>,
}

/// Move `source` (and everything under it) to `dest`.
///
/// An existing `dest` is overwritten after confirmation. Sessions of moved
/// runs are renamed to their new paths, or killed when `kill_sessions` is set.
#[instrument(skip_all, fields(%source, %dest))]
pub fn move_run(
    ws: &Workspace,
    collab: Collaborators<'_>,
    source: &RunPath,
    dest: &RunPath,
    kill_sessions: bool,
) -> Result<MoveOutcome> {
    let mut registry = ws.open_registry()?;
    if registry.tree().resolve(source).is_none() {
        return Err(RegistryError::not_found(source).into());
    }
    if source == dest {
        registry.discard();
        return Ok(MoveOutcome::default());
    }
    if source.starts_with(dest) || dest.starts_with(source) {
        return Err(RegistryError::InvalidMove {
            source_path: source.to_string(),
            dest: dest.to_string(),
            reason: "source and destination overlap".to_string(),
        }
        .into());
    }

    let replaced = match registry.tree().resolve(dest) {
        Some(_) => {
            require(collab.confirm, &format!("{dest} already exists. Overwrite?"))?;
            mutation::remove(registry.tree_mut(), dest)?
        }
        None => Vec::new(),
    };
    let moved = mutation::move_node(registry.tree_mut(), source, dest)?;

    let aux = ws.aux_dirs();
    for old in &replaced {
        kill_session_best_effort(collab.sessions, old);
    }
    if !replaced.is_empty() {
        aux.remove(dest)?;
    }
    aux.rename(source, dest)?;
    for (old, new) in &moved {
        if kill_sessions {
            kill_session_best_effort(collab.sessions, old);
        } else {
            rename_session_best_effort(collab.sessions, old, new);
        }
    }
    registry.commit()?;

    info!(moved = moved.len(), replaced = replaced.len(), "runs moved");
    Ok(MoveOutcome { moved, replaced })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::classify;
    use crate::io::config::RunsConfig;
    use crate::test_support::{Fakes, ScriptedConfirm, SessionCall, TestWorkspace};

    fn path(raw: &str) -> RunPath {
        RunPath::parse(raw).expect("path")
    }

    #[test]
    fn moves_runs_dirs_and_sessions() {
        let test = TestWorkspace::with_config(RunsConfig {
            dir_names: vec!["logs".to_string()],
            ..RunsConfig::default()
        });
        test.seed(&["old/x/1", "old/x/2", "keep"]);
        test.ws.aux_dirs().create(&path("old/x/1")).expect("mkdir");
        let fakes = Fakes::approving();

        let outcome =
            move_run(&test.ws, fakes.collab(), &path("old/x"), &path("new"), false).expect("mv");

        assert_eq!(
            outcome.moved,
            vec![
                (path("old/x/1"), path("new/1")),
                (path("old/x/2"), path("new/2")),
            ]
        );
        assert_eq!(test.run_paths(), vec!["keep", "new/1", "new/2"]);
        assert!(test.tree().resolve(&path("old")).is_none());
        assert!(test.dir.path().join(".runs/aux/logs/new/1").is_dir());
        assert!(!test.dir.path().join(".runs/aux/logs/old/x").exists());
        assert_eq!(
            fakes.sessions.calls(),
            vec![
                SessionCall::Rename {
                    from: "old/x/1".to_string(),
                    to: "new/1".to_string(),
                },
                SessionCall::Rename {
                    from: "old/x/2".to_string(),
                    to: "new/2".to_string(),
                },
            ]
        );
    }

    #[test]
    fn kill_session_flag_kills_instead_of_renaming() {
        let test = TestWorkspace::new();
        test.seed(&["a"]);
        let fakes = Fakes::approving();

        move_run(&test.ws, fakes.collab(), &path("a"), &path("b"), true).expect("mv");

        assert_eq!(
            fakes.sessions.calls(),
            vec![SessionCall::Kill("a".to_string())]
        );
    }

    #[test]
    fn existing_destination_requires_confirmation() {
        let test = TestWorkspace::new();
        test.seed(&["a", "b"]);
        let declining = Fakes {
            confirm: ScriptedConfirm::always(false),
            ..Fakes::approving()
        };

        let err = move_run(&test.ws, declining.collab(), &path("a"), &path("b"), false)
            .expect_err("declined");
        assert!(matches!(
            classify(&err),
            Some(RegistryError::ConfirmationDeclined { .. })
        ));
        assert_eq!(test.run_paths(), vec!["a", "b"]);

        let fakes = Fakes::approving();
        let outcome =
            move_run(&test.ws, fakes.collab(), &path("a"), &path("b"), false).expect("mv");
        assert_eq!(outcome.replaced, vec![path("b")]);
        assert_eq!(
            fakes.confirm.prompts(),
            vec!["b already exists. Overwrite?".to_string()]
        );
        assert_eq!(test.run_paths(), vec!["b"]);
        let tree = test.tree();
        let run = tree
            .node(tree.resolve(&path("b")).expect("b"))
            .metadata()
            .cloned()
            .expect("metadata");
        assert_eq!(run.input_command, "a");
    }

    #[test]
    fn overlapping_paths_are_rejected() {
        let test = TestWorkspace::new();
        test.seed(&["a/b/c"]);
        let fakes = Fakes::approving();

        for (source, dest) in [("a", "a/b/d"), ("a/b/c", "a")] {
            let err = move_run(&test.ws, fakes.collab(), &path(source), &path(dest), false)
                .expect_err("overlap");
            assert!(matches!(
                classify(&err),
                Some(RegistryError::InvalidMove { .. })
            ));
        }
        assert_eq!(test.run_paths(), vec!["a/b/c"]);
        assert!(fakes.confirm.prompts().is_empty());
    }

    #[test]
    fn same_path_is_a_no_op() {
        let test = TestWorkspace::new();
        test.seed(&["a"]);
        let fakes = Fakes::approving();

        let outcome = move_run(&test.ws, fakes.collab(), &path("a"), &path("a"), false).expect("mv");

        assert_eq!(outcome, MoveOutcome::default());
        assert!(fakes.sessions.calls().is_empty());
    }

    #[test]
    fn missing_source_is_not_found() {
        let test = TestWorkspace::new();
        let fakes = Fakes::approving();
        let err = move_run(&test.ws, fakes.collab(), &path("nope"), &path("b"), false)
            .expect_err("missing");
        assert_eq!(classify(&err), Some(&RegistryError::not_found("nope")));
    }
}
