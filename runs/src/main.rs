//! Hierarchical run registry.
//!
//! Tracks experiment runs in `.runs/registry.json`, each launched in its own
//! tmux session named after its path (`exp/lr-sweep/0.1`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use runs::context::{Collaborators, Workspace};
use runs::core::path::RunPath;
use runs::core::pattern::Pattern;
use runs::create::{NewRun, new_run};
use runs::exit_codes;
use runs::inspect;
use runs::io::editor::ExternalEditor;
use runs::io::git::Git;
use runs::io::config::RunsConfig;
use runs::io::init::{InitOptions, RunsPaths, init_runs};
use runs::io::prompt::{AssumeYes, Confirm, TerminalConfirm};
use runs::io::tmux::Tmux;
use runs::killall::kill_all;
use runs::relocate::move_run;
use runs::remove::remove_runs;
use runs::render::Renderer;

#[derive(Parser)]
#[command(name = "runs", version, about = "Hierarchical registry of experiment runs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create `.runs/` with an empty registry and a default config.
    Init {
        /// Overwrite an existing registry and config.
        #[arg(short, long)]
        force: bool,
    },
    /// Start a run in a new tmux session and record it.
    New {
        path: RunPath,
        /// Command to run; the configured prefix and flags are added.
        command: String,
        /// Description; opens the editor when omitted.
        #[arg(short, long)]
        description: Option<String>,
        /// Don't ask before overwriting or running from a dirty repo.
        #[arg(short = 'y', long)]
        assume_yes: bool,
    },
    /// Kill and forget every run matching the patterns.
    Rm {
        #[arg(required = true)]
        patterns: Vec<Pattern>,
        /// Keep runs matching these patterns.
        #[arg(long, num_args = 1..)]
        unless: Vec<Pattern>,
        #[arg(short = 'y', long)]
        assume_yes: bool,
    },
    /// Move a run or directory, renaming sessions along.
    Mv {
        source: RunPath,
        dest: RunPath,
        /// Kill the sessions of moved runs instead of renaming them.
        #[arg(long)]
        kill_session: bool,
        #[arg(short = 'y', long)]
        assume_yes: bool,
    },
    /// List run paths (all runs when no pattern is given).
    Ls {
        patterns: Vec<Pattern>,
        #[arg(long, num_args = 1..)]
        unless: Vec<Pattern>,
    },
    /// Print one metadata field of a run.
    Lookup {
        path: RunPath,
        /// One of: command, full_command, commit, datetime, description.
        key: String,
    },
    /// Pretty-print matching runs.
    Show {
        #[arg(required = true)]
        patterns: Vec<Pattern>,
    },
    /// Replace a run's description; opens the editor when omitted.
    ChangeDescription {
        path: RunPath,
        description: Option<String>,
    },
    /// Print the commands that recreate a run.
    Reproduce {
        path: RunPath,
        /// Suggest a timestamped path instead of overwriting the original.
        #[arg(long)]
        no_overwrite: bool,
    },
    /// Print the flag cross-product of matching runs.
    Flags {
        #[arg(required = true)]
        patterns: Vec<Pattern>,
        #[arg(long, num_args = 1..)]
        unless: Vec<Pattern>,
    },
    /// Kill every session, delete the registry, and remove aux directories.
    Killall {
        #[arg(short = 'y', long)]
        assume_yes: bool,
        /// Aux directory root to remove instead of the configured one.
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

impl Command {
    fn assume_yes(&self) -> bool {
        match self {
            Command::New { assume_yes, .. }
            | Command::Rm { assume_yes, .. }
            | Command::Mv { assume_yes, .. }
            | Command::Killall { assume_yes, .. } => *assume_yes,
            _ => false,
        }
    }
}

fn main() {
    runs::logging::init();
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{err:#}");
            exit_codes::for_error(&err)
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    let root = std::env::current_dir().context("resolve current directory")?;
    // `init` must work even when an existing config is unreadable.
    let ws = match cli.command {
        Command::Init { .. } => Workspace {
            paths: RunsPaths::new(&root),
            config: RunsConfig::default(),
        },
        _ => Workspace::load(&root)?,
    };
    let tmux = Tmux::new(root.clone(), ws.command_timeout());
    let git = Git::new(root.clone(), ws.command_timeout()).ignoring(ws.state_prefixes());
    let editor = ExternalEditor::from_env();
    let confirm: &dyn Confirm = if cli.command.assume_yes() {
        &AssumeYes
    } else {
        &TerminalConfirm
    };
    let collab = Collaborators {
        sessions: &tmux,
        vcs: &git,
        confirm,
        editor: &editor,
    };
    dispatch(&ws, collab, cli.command)
}

fn dispatch(ws: &Workspace, collab: Collaborators<'_>, command: Command) -> Result<()> {
    match command {
        Command::Init { force } => {
            init_runs(&ws.paths.root, &InitOptions { force })?;
        }
        Command::New {
            path,
            command,
            description,
            ..
        } => {
            let outcome = new_run(
                ws,
                collab,
                NewRun {
                    path,
                    command,
                    description,
                },
            )?;
            println!("{}", Renderer::new()?.new_run(&outcome)?);
        }
        Command::Rm {
            patterns, unless, ..
        } => {
            remove_runs(ws, collab, &patterns, &unless)?;
        }
        Command::Mv {
            source,
            dest,
            kill_session,
            ..
        } => {
            move_run(ws, collab, &source, &dest, kill_session)?;
        }
        Command::Ls { patterns, unless } => {
            for path in inspect::list(ws, &patterns, &unless)? {
                println!("{path}");
            }
        }
        Command::Lookup { path, key } => {
            println!("{}", inspect::lookup(ws, &path, &key)?);
        }
        Command::Show { patterns } => {
            println!("{}", inspect::show(ws, &patterns)?.join("\n\n"));
        }
        Command::ChangeDescription { path, description } => {
            inspect::change_description(ws, collab, &path, description)?;
        }
        Command::Reproduce { path, no_overwrite } => {
            println!("{}", inspect::reproduce(ws, &path, no_overwrite)?);
        }
        Command::Flags { patterns, unless } => {
            for line in inspect::flags(ws, &patterns, &unless)? {
                println!("{line}");
            }
        }
        Command::Killall { root, .. } => {
            kill_all(ws, collab, root.as_deref())?;
        }
    }
    Ok(())
}
