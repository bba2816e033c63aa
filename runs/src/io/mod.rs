//! I/O helpers for runs commands.

pub mod config;
pub mod dirs;
pub mod editor;
pub mod git;
pub mod init;
pub mod process;
pub mod prompt;
pub mod registry;
pub mod tmux;
pub mod tree_store;
