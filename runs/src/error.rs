//! Error taxonomy for registry operations.
//!
//! Core modules return [`RegistryError`] directly. Orchestration and io layers
//! use `anyhow` and wrap these values with context; `main` walks the chain to
//! pick an exit code.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no run or directory at `{path}`")]
    PathNotFound { path: String },

    #[error("`{key}` is not a valid key for `{path}`; valid keys are [{}]", valid.join(", "))]
    InvalidKey {
        path: String,
        key: String,
        valid: Vec<String>,
    },

    #[error("registry {} is corrupt: {reason}", path.display())]
    DatabaseCorrupt { path: PathBuf, reason: String },

    #[error("declined: {prompt}")]
    ConfirmationDeclined { prompt: String },

    #[error("{tool} failed: {detail}")]
    ExternalTool { tool: String, detail: String },

    #[error("no runs match [{}]", patterns.join(", "))]
    NoMatch { patterns: Vec<String> },

    #[error("invalid path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("`{path}` already exists")]
    PathExists { path: String },

    #[error("cannot move `{source_path}` to `{dest}`: {reason}")]
    InvalidMove {
        source_path: String,
        dest: String,
        reason: String,
    },

    #[error("flag `{flag}` uses unknown placeholder `<{token}>` (expected <path> or <name>)")]
    InvalidPlaceholder { flag: String, token: String },
}

impl RegistryError {
    pub fn declined(prompt: impl Into<String>) -> Self {
        RegistryError::ConfirmationDeclined {
            prompt: prompt.into(),
        }
    }

    pub fn not_found(path: impl ToString) -> Self {
        RegistryError::PathNotFound {
            path: path.to_string(),
        }
    }

    pub fn external(tool: impl Into<String>, detail: impl Into<String>) -> Self {
        RegistryError::ExternalTool {
            tool: tool.into(),
            detail: detail.into(),
        }
    }
}

/// Find the first [`RegistryError`] in an `anyhow` error chain.
pub fn classify(err: &anyhow::Error) -> Option<&RegistryError> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<RegistryError>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn classify_finds_error_under_context() {
        let result: anyhow::Result<()> =
            Err(RegistryError::not_found("a/b")).context("lookup a/b");
        let err = result.expect_err("error");
        assert_eq!(classify(&err), Some(&RegistryError::not_found("a/b")));
    }

    #[test]
    fn invalid_key_lists_valid_keys() {
        let err = RegistryError::InvalidKey {
            path: "a".to_string(),
            key: "nope".to_string(),
            valid: vec!["command".to_string(), "commit".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "`nope` is not a valid key for `a`; valid keys are [command, commit]"
        );
    }
}
