//! Runs configuration stored under `.runs/config.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::command::check_placeholders;

/// Runs configuration (TOML).
///
/// Missing fields default to values that reproduce plain commands with no
/// prefix, no extra flags, and no auxiliary directories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunsConfig {
    /// Prepended verbatim to every input command.
    pub prefix: String,

    /// Appended to every command, space-separated. May use `<path>` and `<name>`.
    pub flags: Vec<String>,

    /// Delimiter used by `runs flags` to split `key<delim>value` tokens.
    pub delimiter: String,

    /// Root of the auxiliary directory tree (relative to the project root).
    pub root: String,

    /// Per-run directories created as `<root>/<dir_name>/<run path>`.
    pub dir_names: Vec<String>,

    /// Timeout for tmux and git subprocesses, in seconds.
    pub command_timeout_secs: u64,
}

impl Default for RunsConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            flags: Vec::new(),
            delimiter: "=".to_string(),
            root: ".runs/aux".to_string(),
            dir_names: Vec::new(),
            command_timeout_secs: 30,
        }
    }
}

impl RunsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.delimiter.chars().count() != 1 {
            return Err(anyhow!(
                "delimiter must be a single character, got '{}'",
                self.delimiter
            ));
        }
        if self.command_timeout_secs == 0 {
            return Err(anyhow!("command_timeout_secs must be > 0"));
        }
        if self.root.trim().is_empty() {
            return Err(anyhow!("root must be non-empty"));
        }
        for name in &self.dir_names {
            if name.trim().is_empty() || name.contains('/') {
                return Err(anyhow!("dir_names entry '{name}' must be a single segment"));
            }
        }
        for flag in &self.flags {
            check_placeholders(flag)?;
        }
        Ok(())
    }

    /// The validated delimiter character.
    pub fn delimiter_char(&self) -> Result<char> {
        let mut chars = self.delimiter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(anyhow!(
                "delimiter must be a single character, got '{}'",
                self.delimiter
            )),
        }
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `RunsConfig::default()`.
pub fn load_config(path: &Path) -> Result<RunsConfig> {
    if !path.exists() {
        let cfg = RunsConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RunsConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &RunsConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
