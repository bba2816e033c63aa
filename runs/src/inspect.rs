//! Read-only commands (`ls`, `lookup`, `show`, `reproduce`, `flags`) and
//! `change-description`.

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::context::{Collaborators, Workspace};
use crate::core::flags::{parse_flags, render_flags};
use crate::core::mutation;
use crate::core::path::RunPath;
use crate::core::pattern::Pattern;
use crate::core::query::descendants;
use crate::core::types::RunMetadata;
use crate::create::now_iso;
use crate::error::RegistryError;
use crate::render::Renderer;
use crate::tree::Tree;

pub const EDIT_DESCRIPTION_PROMPT: &str = "Edit description";

/// Matching runs as `(path, metadata)` pairs, in tree order.
///
/// No patterns means every run; otherwise a query that matches nothing while
/// some pattern missed is [`RegistryError::NoMatch`].
pub fn matching_runs(
    tree: &Tree,
    patterns: &[Pattern],
    unless: &[Pattern],
) -> Result<Vec<(RunPath, RunMetadata)>, RegistryError> {
    let ids = if patterns.is_empty() {
        descendants(tree, &[Pattern::everything()], unless).runs
    } else {
        descendants(tree, patterns, unless).require_runs()?
    };
    Ok(ids
        .into_iter()
        .filter_map(|id| {
            let path = tree.path_of(id)?;
            let metadata = tree.node(id).metadata()?.clone();
            Some((path, metadata))
        })
        .collect())
}

/// Paths of matching runs (`runs ls`).
pub fn list(ws: &Workspace, patterns: &[Pattern], unless: &[Pattern]) -> Result<Vec<RunPath>> {
    let registry = ws.open_registry()?;
    let runs = matching_runs(registry.tree(), patterns, unless)?;
    Ok(runs.into_iter().map(|(path, _)| path).collect())
}

pub fn lookup(ws: &Workspace, path: &RunPath, key: &str) -> Result<String> {
    let registry = ws.open_registry()?;
    Ok(mutation::lookup(registry.tree(), path, key)?)
}

/// One rendered block per matching run (`runs show`).
pub fn show(ws: &Workspace, patterns: &[Pattern]) -> Result<Vec<String>> {
    let registry = ws.open_registry()?;
    let renderer = Renderer::new()?;
    matching_runs(registry.tree(), patterns, &[])?
        .iter()
        .map(|(path, run)| renderer.show(path, run))
        .collect()
}

/// Instructions to recreate the run at `path` (`runs reproduce`).
///
/// With `no_overwrite` the suggested path gets the current timestamp appended
/// so the reproduction does not replace the original.
pub fn reproduce(ws: &Workspace, path: &RunPath, no_overwrite: bool) -> Result<String> {
    let registry = ws.open_registry()?;
    let run = run_metadata(registry.tree(), path)?;
    let new_path = if no_overwrite {
        path.with_suffix(&now_iso())
    } else {
        path.clone()
    };
    Renderer::new()?.reproduce(path, &new_path, run)
}

/// Cross-product summary lines for matching runs (`runs flags`).
pub fn flags(ws: &Workspace, patterns: &[Pattern], unless: &[Pattern]) -> Result<Vec<String>> {
    let delimiter = ws.config.delimiter_char()?;
    let registry = ws.open_registry()?;
    let commands: Vec<String> = matching_runs(registry.tree(), patterns, unless)?
        .into_iter()
        .map(|(_, run)| run.input_command)
        .collect();
    debug!(runs = commands.len(), %delimiter, "aggregating flags");
    Ok(render_flags(&parse_flags(&commands, delimiter), delimiter))
}

/// Replace a run's description; the editor collects it when `None`.
#[instrument(skip_all, fields(%path))]
pub fn change_description(
    ws: &Workspace,
    collab: Collaborators<'_>,
    path: &RunPath,
    description: Option<String>,
) -> Result<()> {
    let mut registry = ws.open_registry()?;
    let description = match description {
        Some(description) => description,
        None => {
            let current = &run_metadata(registry.tree(), path)?.description;
            collab
                .editor
                .edit(EDIT_DESCRIPTION_PROMPT, current)
                .context("collect description")?
        }
    };
    mutation::set_description(registry.tree_mut(), path, description)?;
    registry.commit()
}

fn run_metadata<'a>(tree: &'a Tree, path: &RunPath) -> Result<&'a RunMetadata, RegistryError> {
    let id = tree
        .resolve(path)
        .ok_or_else(|| RegistryError::not_found(path))?;
    tree.node(id)
        .metadata()
        .ok_or_else(|| RegistryError::InvalidKey {
            path: path.to_string(),
            key: "description".to_string(),
            valid: Vec::new(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::classify;
    use crate::io::tree_store::write_tree;
    use crate::test_support::{Fakes, FixedEditor, TestWorkspace, metadata};

    fn path(raw: &str) -> RunPath {
        RunPath::parse(raw).expect("path")
    }

    fn patterns(raw: &[&str]) -> Vec<Pattern> {
        raw.iter()
            .map(|p| Pattern::parse(p).expect("pattern"))
            .collect()
    }

    #[test]
    fn list_without_patterns_returns_every_run() {
        let test = TestWorkspace::new();
        test.seed(&["a", "a/b", "c/d"]);
        let all = list(&test.ws, &[], &[]).expect("ls");
        assert_eq!(all, vec![path("a"), path("a/b"), path("c/d")]);

        let filtered = list(&test.ws, &[], &patterns(&["a"])).expect("ls");
        assert_eq!(filtered, vec![path("c/d")]);
    }

    #[test]
    fn list_on_empty_registry_is_empty() {
        let test = TestWorkspace::new();
        assert!(list(&test.ws, &[], &[]).expect("ls").is_empty());
    }

    #[test]
    fn lookup_reads_fields_and_reports_missing_paths() {
        let test = TestWorkspace::new();
        test.seed(&["exp/a"]);
        assert_eq!(
            lookup(&test.ws, &path("exp/a"), "command").expect("lookup"),
            "exp/a"
        );
        let err = lookup(&test.ws, &path("exp/b"), "command").expect_err("missing");
        assert_eq!(classify(&err), Some(&RegistryError::not_found("exp/b")));
    }

    #[test]
    fn show_renders_one_block_per_run() {
        let test = TestWorkspace::new();
        test.seed(&["a/x", "a/y"]);
        let blocks = show(&test.ws, &patterns(&["a"])).expect("show");
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("a/x\n===\n"));
        assert!(blocks[1].starts_with("a/y\n===\n"));
    }

    #[test]
    fn reproduce_optionally_suffixes_path() {
        let test = TestWorkspace::new();
        test.seed(&["a/b"]);

        let text = reproduce(&test.ws, &path("a/b"), false).expect("reproduce");
        assert!(text.contains("git checkout 0123abc\n"));
        assert!(text.contains("runs new a/b 'a/b' --description="));

        let text = reproduce(&test.ws, &path("a/b"), true).expect("reproduce");
        let new_line = text.lines().last().expect("line");
        assert!(new_line.starts_with("runs new a/b20"));
        assert!(new_line.contains("Reproduce a/b."));
    }

    #[test]
    fn flags_summarize_input_commands() {
        let test = TestWorkspace::new();
        let mut tree = Tree::new();
        for (name, command) in [("1", "train.py --lr=0.1 --bs=32"), ("2", "train.py --lr=0.2")] {
            let run = path(&format!("sweep/{name}"));
            mutation::create(&mut tree, &run, metadata(command), |_| false).expect("create");
        }
        write_tree(&test.ws.paths.registry_path, &tree).expect("write");

        let lines = flags(&test.ws, &patterns(&["sweep/*"]), &[]).expect("flags");
        assert_eq!(lines, vec!["lr=0.1|0.2", "bs=32"]);
    }

    #[test]
    fn change_description_uses_editor_when_missing() {
        let test = TestWorkspace::new();
        test.seed(&["a"]);
        let fakes = Fakes {
            editor: FixedEditor::returning("edited"),
            ..Fakes::approving()
        };

        change_description(&test.ws, fakes.collab(), &path("a"), None).expect("change");

        assert_eq!(
            fakes.editor.seen(),
            vec![(EDIT_DESCRIPTION_PROMPT.to_string(), "a description".to_string())]
        );
        assert_eq!(
            lookup(&test.ws, &path("a"), "description").expect("lookup"),
            "edited"
        );
    }

    #[test]
    fn change_description_on_directory_is_invalid_key() {
        let test = TestWorkspace::new();
        test.seed(&["a/b"]);
        let fakes = Fakes::approving();
        let err = change_description(&test.ws, fakes.collab(), &path("a"), Some("x".to_string()))
            .expect_err("directory");
        assert!(matches!(
            classify(&err),
            Some(RegistryError::InvalidKey { .. })
        ));
    }
}
