//! Test-only helpers: tree builders, scripted collaborators, scratch workspaces.

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::{Result, anyhow};
use tempfile::TempDir;

use crate::context::{Collaborators, Workspace};
use crate::core::path::RunPath;
use crate::core::types::RunMetadata;
use crate::error::RegistryError;
use crate::io::config::{RunsConfig, write_config};
use crate::io::editor::Editor;
use crate::io::git::VersionControl;
use crate::io::init::{InitOptions, init_runs};
use crate::io::prompt::Confirm;
use crate::io::tmux::SessionManager;
use crate::io::tree_store::{load_tree, write_tree};
use crate::tree::{NodeId, Tree};

/// Deterministic metadata for a run launched with `input_command`.
pub fn metadata(input_command: &str) -> RunMetadata {
    RunMetadata {
        full_command: format!("python {input_command}"),
        commit: "0123abc".to_string(),
        datetime: "2026-01-01T10:00:00.000000".to_string(),
        description: format!("{input_command} description"),
        input_command: input_command.to_string(),
    }
}

/// Tree with a run at each path. List parents before their sub-runs.
pub fn tree_with_runs(paths: &[&str]) -> Tree {
    let mut tree = Tree::new();
    for raw in paths {
        let path = RunPath::parse(raw).expect("valid test path");
        let parent = tree.ensure_dirs(path.parent_segments());
        tree.insert(parent, path.head(), Some(metadata(raw)))
            .expect("unique test path");
    }
    tree
}

/// Display paths of `ids`, in order.
pub fn paths_of(tree: &Tree, ids: &[NodeId]) -> Vec<String> {
    ids.iter()
        .filter_map(|&id| tree.path_of(id))
        .map(|path| path.to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    New {
        path: String,
        window: String,
        command: String,
    },
    Kill(String),
    Rename {
        from: String,
        to: String,
    },
}

/// [`SessionManager`] that records calls instead of spawning tmux.
#[derive(Debug, Default)]
pub struct RecordingSessions {
    calls: RefCell<Vec<SessionCall>>,
    fail_start: bool,
    fail_teardown: bool,
}

impl RecordingSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// `new_session` fails like a missing tmux binary.
    pub fn failing_start() -> Self {
        Self {
            fail_start: true,
            ..Self::default()
        }
    }

    /// `kill` and `rename` fail.
    pub fn failing_teardown() -> Self {
        Self {
            fail_teardown: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<SessionCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: SessionCall, fail: bool) -> Result<()> {
        self.calls.borrow_mut().push(call);
        if fail {
            return Err(RegistryError::external("tmux", "scripted failure").into());
        }
        Ok(())
    }
}

impl SessionManager for RecordingSessions {
    fn new_session(&self, path: &str, window_name: &str, command: &str) -> Result<()> {
        self.record(
            SessionCall::New {
                path: path.to_string(),
                window: window_name.to_string(),
                command: command.to_string(),
            },
            self.fail_start,
        )
    }

    fn kill(&self, path: &str) -> Result<()> {
        self.record(SessionCall::Kill(path.to_string()), self.fail_teardown)
    }

    fn rename(&self, path: &str, new_name: &str) -> Result<()> {
        self.record(
            SessionCall::Rename {
                from: path.to_string(),
                to: new_name.to_string(),
            },
            self.fail_teardown,
        )
    }
}

/// [`VersionControl`] with a fixed answer.
#[derive(Debug, Clone)]
pub struct FakeVcs {
    pub dirty: bool,
    pub commit: String,
}

impl FakeVcs {
    pub fn clean() -> Self {
        Self {
            dirty: false,
            commit: "0123abc".to_string(),
        }
    }

    pub fn dirty() -> Self {
        Self {
            dirty: true,
            ..Self::clean()
        }
    }
}

impl VersionControl for FakeVcs {
    fn is_dirty(&self) -> Result<bool> {
        Ok(self.dirty)
    }

    fn current_commit(&self) -> Result<String> {
        Ok(self.commit.clone())
    }
}

/// [`Confirm`] that replays scripted answers and records every prompt.
///
/// Once the script runs out it answers with `fallback`.
#[derive(Debug, Default)]
pub struct ScriptedConfirm {
    answers: RefCell<VecDeque<bool>>,
    fallback: bool,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn always(answer: bool) -> Self {
        Self {
            fallback: answer,
            ..Self::default()
        }
    }

    pub fn answers(answers: &[bool]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().copied().collect()),
            ..Self::default()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        self.prompts.borrow_mut().push(prompt.to_string());
        Ok(self
            .answers
            .borrow_mut()
            .pop_front()
            .unwrap_or(self.fallback))
    }
}

/// [`Editor`] returning a fixed text, or failing when none is set.
#[derive(Debug, Default)]
pub struct FixedEditor {
    text: Option<String>,
    seen: RefCell<Vec<(String, String)>>,
}

impl FixedEditor {
    pub fn returning(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }

    /// Editor that must not be opened.
    pub fn unused() -> Self {
        Self::default()
    }

    /// `(prompt, initial)` pairs the editor was opened with.
    pub fn seen(&self) -> Vec<(String, String)> {
        self.seen.borrow().clone()
    }
}

impl Editor for FixedEditor {
    fn edit(&self, prompt: &str, initial: &str) -> Result<String> {
        self.seen
            .borrow_mut()
            .push((prompt.to_string(), initial.to_string()));
        self.text
            .clone()
            .ok_or_else(|| anyhow!("editor opened unexpectedly"))
    }
}

/// Initialized `.runs/` in a temp directory.
pub struct TestWorkspace {
    pub dir: TempDir,
    pub ws: Workspace,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self::with_config(RunsConfig::default())
    }

    pub fn with_config(config: RunsConfig) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = init_runs(dir.path(), &InitOptions { force: false }).expect("init");
        write_config(&paths.config_path, &config).expect("write config");
        let ws = Workspace::load(dir.path()).expect("load workspace");
        Self { dir, ws }
    }

    /// Replace the registry with runs at `paths` (parents first).
    pub fn seed(&self, paths: &[&str]) {
        write_tree(&self.ws.paths.registry_path, &tree_with_runs(paths)).expect("seed registry");
    }

    /// Current registry contents.
    pub fn tree(&self) -> Tree {
        load_tree(&self.ws.paths.registry_path).expect("load registry")
    }

    /// Paths of every run in the registry.
    pub fn run_paths(&self) -> Vec<String> {
        let tree = self.tree();
        paths_of(&tree, &tree.runs_under(tree.root()))
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Scripted collaborators bundled for a test.
pub struct Fakes {
    pub sessions: RecordingSessions,
    pub vcs: FakeVcs,
    pub confirm: ScriptedConfirm,
    pub editor: FixedEditor,
}

impl Fakes {
    /// Clean repo, every prompt approved, editor unused.
    pub fn approving() -> Self {
        Self {
            sessions: RecordingSessions::new(),
            vcs: FakeVcs::clean(),
            confirm: ScriptedConfirm::always(true),
            editor: FixedEditor::unused(),
        }
    }

    pub fn collab(&self) -> Collaborators<'_> {
        Collaborators {
            sessions: &self.sessions,
            vcs: &self.vcs,
            confirm: &self.confirm,
            editor: &self.editor,
        }
    }
}
