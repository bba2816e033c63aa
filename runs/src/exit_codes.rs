//! Stable exit codes for `runs` commands.

use crate::error::{RegistryError, classify};

/// Command succeeded.
pub const OK: i32 = 0;
/// Invalid input, config, or any failure without a more specific code.
pub const INVALID: i32 = 1;
/// A path or pattern did not resolve.
pub const NOT_FOUND: i32 = 2;
/// The user declined a confirmation prompt.
pub const DECLINED: i32 = 3;
/// The registry file is missing or unreadable.
pub const CORRUPT: i32 = 4;
/// tmux, git, or the editor failed.
pub const EXTERNAL: i32 = 5;

/// Exit code for an error, from the first [`RegistryError`] in its chain.
pub fn for_error(err: &anyhow::Error) -> i32 {
    match classify(err) {
        Some(RegistryError::PathNotFound { .. } | RegistryError::NoMatch { .. }) => NOT_FOUND,
        Some(RegistryError::ConfirmationDeclined { .. }) => DECLINED,
        Some(RegistryError::DatabaseCorrupt { .. }) => CORRUPT,
        Some(RegistryError::ExternalTool { .. }) => EXTERNAL,
        _ => INVALID,
    }
}
