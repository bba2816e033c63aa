//! Run metadata and the key mapping used by `runs lookup`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Metadata recorded for every run at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Exact string sent to the session (prefix + input + flags).
    pub full_command: String,
    /// Commit checked out when the run was created.
    pub commit: String,
    /// Creation timestamp, ISO-8601 without offset.
    pub datetime: String,
    pub description: String,
    /// Command as typed by the user; surfaced as `command`.
    pub input_command: String,
}

/// Keys accepted by [`RunMetadata::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKey {
    Command,
    FullCommand,
    Commit,
    Datetime,
    Description,
}

impl MetadataKey {
    pub const ALL: [MetadataKey; 5] = [
        MetadataKey::Command,
        MetadataKey::FullCommand,
        MetadataKey::Commit,
        MetadataKey::Datetime,
        MetadataKey::Description,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetadataKey::Command => "command",
            MetadataKey::FullCommand => "full_command",
            MetadataKey::Commit => "commit",
            MetadataKey::Datetime => "datetime",
            MetadataKey::Description => "description",
        }
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetadataKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or(())
    }
}

impl RunMetadata {
    pub fn get(&self, key: MetadataKey) -> &str {
        match key {
            MetadataKey::Command => &self.input_command,
            MetadataKey::FullCommand => &self.full_command,
            MetadataKey::Commit => &self.commit,
            MetadataKey::Datetime => &self.datetime,
            MetadataKey::Description => &self.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_key_reads_input_command() {
        let meta = RunMetadata {
            full_command: "python train.py --seed=1".to_string(),
            commit: "abc".to_string(),
            datetime: "2026-01-01T00:00:00.000000".to_string(),
            description: "d".to_string(),
            input_command: "train.py".to_string(),
        };
        assert_eq!(meta.get(MetadataKey::Command), "train.py");
        assert_eq!(
            meta.get(MetadataKey::FullCommand),
            "python train.py --seed=1"
        );
    }

    #[test]
    fn internal_field_name_is_not_a_key() {
        assert!("input_command".parse::<MetadataKey>().is_err());
        assert_eq!("commit".parse::<MetadataKey>(), Ok(MetadataKey::Commit));
    }
}
