//! Orchestration for `runs killall`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::context::{Collaborators, Workspace, kill_session_best_effort, listing_prompt};
use crate::core::path::RunPath;
use crate::core::query::all_runs;
use crate::io::dirs::AuxDirs;
use crate::io::prompt::require;

/// Kill every session, delete the registry file, and remove the aux tree.
///
/// `root` overrides the configured aux directory root. The registry is gone
/// afterwards; `runs init` recreates it.
#[instrument(skip_all)]
pub fn kill_all(
    ws: &Workspace,
    collab: Collaborators<'_>,
    root: Option<&Path>,
) -> Result<Vec<RunPath>> {
    let registry = ws.open_registry()?;
    let runs: Vec<RunPath> = {
        let tree = registry.tree();
        all_runs(tree)
            .into_iter()
            .filter_map(|id| tree.path_of(id))
            .collect()
    };
    require(
        collab.confirm,
        &listing_prompt("Runs to be removed:", &runs, "Continue?"),
    )?;

    for path in &runs {
        kill_session_best_effort(collab.sessions, path);
    }
    let registry_path = registry.path().to_path_buf();
    registry.discard();
    fs::remove_file(&registry_path)
        .with_context(|| format!("remove {}", registry_path.display()))?;

    let aux = match root {
        Some(root) => AuxDirs::new(ws.paths.root.join(root), Vec::new()),
        None => ws.aux_dirs(),
    };
    aux.remove_all()?;

    info!(killed = runs.len(), "registry destroyed");
    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RegistryError, classify};
    use crate::io::config::RunsConfig;
    use crate::test_support::{Fakes, ScriptedConfirm, SessionCall, TestWorkspace};

    #[test]
    fn destroys_registry_sessions_and_aux_root() {
        let test = TestWorkspace::with_config(RunsConfig {
            dir_names: vec!["logs".to_string()],
            ..RunsConfig::default()
        });
        test.seed(&["a", "b/c"]);
        test.ws
            .aux_dirs()
            .create(&RunPath::parse("a").expect("path"))
            .expect("mkdir");
        let fakes = Fakes::approving();

        let killed = kill_all(&test.ws, fakes.collab(), None).expect("killall");

        assert_eq!(killed.len(), 2);
        assert_eq!(
            fakes.sessions.calls(),
            vec![
                SessionCall::Kill("a".to_string()),
                SessionCall::Kill("b/c".to_string()),
            ]
        );
        assert!(!test.ws.paths.registry_path.exists());
        assert!(!test.dir.path().join(".runs/aux").exists());

        let err = test.ws.open_registry().expect_err("registry gone");
        assert!(matches!(
            classify(&err),
            Some(RegistryError::DatabaseCorrupt { .. })
        ));
    }

    #[test]
    fn declined_killall_keeps_everything() {
        let test = TestWorkspace::new();
        test.seed(&["a"]);
        let fakes = Fakes {
            confirm: ScriptedConfirm::always(false),
            ..Fakes::approving()
        };

        kill_all(&test.ws, fakes.collab(), None).expect_err("declined");

        assert_eq!(
            fakes.confirm.prompts(),
            vec!["Runs to be removed:\na\nContinue?".to_string()]
        );
        assert!(fakes.sessions.calls().is_empty());
        assert_eq!(test.run_paths(), vec!["a"]);
    }

    #[test]
    fn custom_root_is_removed() {
        let test = TestWorkspace::new();
        let custom = test.dir.path().join("scratch");
        std::fs::create_dir_all(custom.join("nested")).expect("mkdir");
        let fakes = Fakes::approving();

        kill_all(&test.ws, fakes.collab(), Some(Path::new("scratch"))).expect("killall");

        assert!(!custom.exists());
    }
}
