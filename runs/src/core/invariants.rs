//! Structural invariants not expressible via JSON Schema.

use std::collections::HashSet;

use crate::tree::{DOCUMENT_VERSION, NodeDocument, TreeDocument};

/// Check a persisted document:
/// - Supported `version`
/// - Names are non-empty, contain no `/` and no whitespace, and are not `.`/`..`
/// - No two siblings share a name
///
/// Nesting makes every node reachable from the root and rules out cycles.
pub fn validate_invariants(doc: &TreeDocument) -> Vec<String> {
    let mut errors = Vec::new();
    if doc.version != DOCUMENT_VERSION {
        errors.push(format!(
            "unsupported version {} (expected {})",
            doc.version, DOCUMENT_VERSION
        ));
    }
    validate_children(&doc.children, "", &mut errors);
    errors
}

fn validate_children(children: &[NodeDocument], path: &str, errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for child in children {
        let child_path = if path.is_empty() {
            child.name.clone()
        } else {
            format!("{}/{}", path, child.name)
        };
        if let Some(reason) = bad_name(&child.name) {
            errors.push(format!("{}: {}", display(&child_path), reason));
        }
        if !seen.insert(child.name.as_str()) {
            errors.push(format!("duplicate name '{}' at {}", child.name, display(path)));
        }
        validate_children(&child.children, &child_path, errors);
    }
}

fn bad_name(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("empty name");
    }
    if name.contains('/') {
        return Some("name contains '/'");
    }
    if name == "." || name == ".." {
        return Some("relative name");
    }
    if name.chars().any(char::is_whitespace) {
        return Some("name contains whitespace");
    }
    None
}

fn display(path: &str) -> &str {
    if path.is_empty() { "<root>" } else { path }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir(name: &str, children: Vec<NodeDocument>) -> NodeDocument {
        NodeDocument {
            name: name.to_string(),
            metadata: None,
            children,
        }
    }

    #[test]
    fn valid_document_has_no_errors() {
        let doc = TreeDocument {
            version: DOCUMENT_VERSION,
            children: vec![dir("a", vec![dir("b", vec![])]), dir("c", vec![])],
        };
        assert!(validate_invariants(&doc).is_empty());
    }

    #[test]
    fn reports_duplicates_and_bad_names() {
        let doc = TreeDocument {
            version: 7,
            children: vec![
                dir("a", vec![dir("x/y", vec![]), dir("", vec![])]),
                dir("a", vec![]),
            ],
        };
        let errors = validate_invariants(&doc);
        assert!(errors.iter().any(|e| e.contains("unsupported version 7")));
        assert!(errors.iter().any(|e| e.contains("duplicate name 'a' at <root>")));
        assert!(errors.iter().any(|e| e.contains("contains '/'")));
        assert!(errors.iter().any(|e| e.contains("empty name")));
    }
}
