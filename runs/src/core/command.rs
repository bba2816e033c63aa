//! Full-command construction: prefix + input command + interpolated flags.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::path::RunPath;
use crate::error::RegistryError;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^<>]*)>").unwrap_or_else(|err| panic!("{err}")));

const KNOWN_PLACEHOLDERS: [&str; 2] = ["path", "name"];

/// Reject any `<token>` in `flag` other than `<path>` and `<name>`.
pub fn check_placeholders(flag: &str) -> Result<(), RegistryError> {
    for capture in PLACEHOLDER.captures_iter(flag) {
        let token = &capture[1];
        if !KNOWN_PLACEHOLDERS.contains(&token) {
            return Err(RegistryError::InvalidPlaceholder {
                flag: flag.to_string(),
                token: token.to_string(),
            });
        }
    }
    Ok(())
}

/// Substitute `<path>` and `<name>` for the run at `path`.
pub fn interpolate(flag: &str, path: &RunPath) -> Result<String, RegistryError> {
    check_placeholders(flag)?;
    Ok(flag
        .replace("<path>", &path.to_string())
        .replace("<name>", path.head()))
}

/// Build the string sent to the session for a new run.
pub fn build_command(
    prefix: &str,
    flags: &[String],
    input_command: &str,
    path: &RunPath,
) -> Result<String, RegistryError> {
    let mut command = input_command.to_string();
    for flag in flags {
        command.push(' ');
        command.push_str(&interpolate(flag, path)?);
    }
    Ok(format!("{prefix}{command}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(raw: &str) -> RunPath {
        RunPath::parse(raw).expect("path")
    }

    #[test]
    fn builds_prefix_command_and_flags() {
        let flags = vec![
            "--log-dir=logs/<path>".to_string(),
            "--name=<name>".to_string(),
        ];
        let full = build_command("python ", &flags, "train.py --lr=0.1", &path("sweep/lr"))
            .expect("build");
        assert_eq!(
            full,
            "python train.py --lr=0.1 --log-dir=logs/sweep/lr --name=lr"
        );
    }

    #[test]
    fn no_flags_is_prefix_plus_input() {
        assert_eq!(
            build_command("", &[], "echo hi", &path("a")).expect("build"),
            "echo hi"
        );
    }

    #[test]
    fn unknown_placeholder_is_rejected() {
        let flags = vec!["--out=<path>/<seed>".to_string()];
        assert_eq!(
            build_command("", &flags, "x", &path("a")),
            Err(RegistryError::InvalidPlaceholder {
                flag: "--out=<path>/<seed>".to_string(),
                token: "seed".to_string(),
            })
        );
    }
}
