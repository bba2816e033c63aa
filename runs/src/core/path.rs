//! Slash-delimited run paths.

use std::fmt;
use std::str::FromStr;

use crate::error::RegistryError;

/// A concrete path from the (implicit) root to a node, e.g. `exp/lr-sweep/0.1`.
///
/// Leading and trailing slashes are ignored. Segments are non-empty and may not
/// be `.` or `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunPath {
    segments: Vec<String>,
}

impl RunPath {
    pub fn parse(raw: &str) -> Result<Self, RegistryError> {
        let trimmed = raw.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(invalid(raw, "path is empty"));
        }
        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            if segment.is_empty() {
                return Err(invalid(raw, "empty segment"));
            }
            if segment == "." || segment == ".." {
                return Err(invalid(raw, "relative segments are not allowed"));
            }
            if segment.chars().any(char::is_whitespace) {
                return Err(invalid(raw, "segments may not contain whitespace"));
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    pub(crate) fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Final segment (the run's name).
    pub fn head(&self) -> &str {
        // Construction guarantees at least one segment.
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Segments of the parent directory; empty for top-level runs.
    pub fn parent_segments(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// True if `self` equals `other` or lies underneath it.
    pub fn starts_with(&self, other: &RunPath) -> bool {
        self.segments.len() >= other.segments.len()
            && self.segments[..other.segments.len()] == other.segments[..]
    }

    /// Append a timestamp-like suffix to the final segment.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        let mut segments = self.segments.clone();
        if let Some(last) = segments.last_mut() {
            last.push_str(suffix);
        }
        Self { segments }
    }
}

fn invalid(raw: &str, reason: &str) -> RegistryError {
    RegistryError::InvalidPath {
        path: raw.to_string(),
        reason: reason.to_string(),
    }
}

impl fmt::Display for RunPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl FromStr for RunPath {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RunPath::parse(s)
    }
}
