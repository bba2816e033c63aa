//! Registry load/save with schema + invariant validation.
//!
//! Any failure to read or validate the registry file is reported as
//! [`RegistryError::DatabaseCorrupt`]; a missing file is never treated as an
//! empty tree.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use jsonschema::validator_for;
use serde_json::Value;
use tracing::debug;

use crate::core::invariants::validate_invariants;
use crate::error::RegistryError;
use crate::tree::{Tree, TreeDocument};

pub const REGISTRY_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/schemas/registry.v1.schema.json"
));

/// Load and validate the registry document (schema + invariants).
pub fn load_document(tree_path: &Path) -> Result<TreeDocument> {
    let corrupt = |reason: String| RegistryError::DatabaseCorrupt {
        path: tree_path.to_path_buf(),
        reason,
    };

    let contents = fs::read_to_string(tree_path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            corrupt("file is missing (run `runs init`)".to_string())
        } else {
            corrupt(format!("unreadable: {err}"))
        }
    })?;
    let value: Value =
        serde_json::from_str(&contents).map_err(|err| corrupt(format!("invalid json: {err}")))?;
    validate_schema(&value).map_err(corrupt)?;
    let doc: TreeDocument =
        serde_json::from_value(value).map_err(|err| corrupt(format!("deserialize: {err}")))?;
    let errors = validate_invariants(&doc);
    if !errors.is_empty() {
        return Err(corrupt(format!("invariants failed: {}", errors.join("; "))).into());
    }
    debug!(path = %tree_path.display(), "registry loaded");
    Ok(doc)
}

pub fn load_tree(tree_path: &Path) -> Result<Tree> {
    Ok(Tree::from_document(&load_document(tree_path)?))
}

/// Atomically write the tree (temp file + rename), pretty-printed.
pub fn write_tree(tree_path: &Path, tree: &Tree) -> Result<()> {
    write_document(tree_path, &tree.to_document())
}

pub fn write_document(tree_path: &Path, doc: &TreeDocument) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(doc).context("serialize registry")?;
    buf.push('\n');
    write_atomic(tree_path, &buf)?;
    debug!(path = %tree_path.display(), "registry written");
    Ok(())
}

fn validate_schema(tree: &Value) -> std::result::Result<(), String> {
    let schema: Value = serde_json::from_str(REGISTRY_SCHEMA)
        .map_err(|err| format!("embedded schema is invalid: {err}"))?;
    let compiled = validator_for(&schema).map_err(|err| format!("invalid schema: {err}"))?;
    if compiled.is_valid(tree) {
        return Ok(());
    }
    let messages = compiled
        .iter_errors(tree)
        .map(|err| err.to_string())
        .collect::<Vec<_>>();
    Err(format!("schema validation failed: {}", messages.join("; ")))
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("registry path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp registry {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace registry {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::classify;
    use crate::test_support::tree_with_runs;

    fn is_corrupt(err: &anyhow::Error) -> bool {
        matches!(
            classify(err),
            Some(RegistryError::DatabaseCorrupt { .. })
        )
    }

    /// Verifies write → load → write reproduces the file byte for byte.
    #[test]
    fn save_of_load_is_identity() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("registry.json");
        write_tree(&path, &tree_with_runs(&["b/x", "a", "b/y/z"])).expect("write");
        let first = fs::read_to_string(&path).expect("read");

        let tree = load_tree(&path).expect("load");
        write_tree(&path, &tree).expect("rewrite");
        assert_eq!(fs::read_to_string(&path).expect("read"), first);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn missing_file_is_corrupt_not_empty() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = load_tree(&temp.path().join("nope.json")).expect_err("missing");
        assert!(is_corrupt(&err));
    }

    #[test]
    fn garbage_and_schema_violations_are_corrupt() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("registry.json");

        fs::write(&path, "{not json").expect("write");
        assert!(is_corrupt(&load_tree(&path).expect_err("garbage")));

        fs::write(&path, r#"{"version":1,"children":[{"name":"a"}]}"#).expect("write");
        assert!(is_corrupt(&load_tree(&path).expect_err("schema")));
    }

    #[test]
    fn duplicate_siblings_are_corrupt() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("registry.json");
        fs::write(
            &path,
            r#"{"version":1,"children":[{"name":"a","children":[]},{"name":"a","children":[]}]}"#,
        )
        .expect("write");
        let err = load_tree(&path).expect_err("duplicate");
        assert!(is_corrupt(&err));
        assert!(format!("{err:#}").contains("duplicate name 'a'"));
    }
}
