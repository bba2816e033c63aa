//! Hierarchical registry of experiment runs.
//!
//! Every run is a node in a slash-delimited tree (`exp/lr-sweep/0.1`) that
//! records the command it was launched with, the commit it ran against, a
//! timestamp, and a description. The crate keeps a strict split:
//!
//! - **[`core`]**: Pure logic over the in-memory [`tree::Tree`] (paths,
//!   patterns, queries, mutations, flag aggregation). No I/O.
//! - **[`io`]**: Side effects (registry file, config, tmux, git, editor,
//!   prompts, auxiliary directories). Collaborators sit behind traits so tests
//!   can script them.
//!
//! Orchestration modules ([`create`], [`remove`], [`relocate`], [`inspect`],
//! [`killall`]) combine the two to implement CLI commands.

pub mod context;
pub mod core;
pub mod create;
pub mod error;
pub mod exit_codes;
pub mod inspect;
pub mod io;
pub mod killall;
pub mod logging;
pub mod relocate;
pub mod remove;
pub mod render;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod tree;
