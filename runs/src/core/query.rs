//! Descendant queries: patterns minus exclusions, resolved to runs.

use crate::core::pattern::Pattern;
use crate::error::RegistryError;
use crate::tree::{NodeId, Tree};

/// Result of resolving a set of patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Matching runs in tree/insertion order.
    pub runs: Vec<NodeId>,
    /// Candidate patterns that matched no node at all.
    pub unmatched: Vec<String>,
}

impl Resolution {
    /// Fail with `NoMatch` when nothing was found and some pattern missed.
    ///
    /// An empty result whose patterns all matched (e.g. everything excluded)
    /// is not an error.
    pub fn require_runs(self) -> Result<Vec<NodeId>, RegistryError> {
        if self.runs.is_empty() && !self.unmatched.is_empty() {
            return Err(RegistryError::NoMatch {
                patterns: self.unmatched,
            });
        }
        Ok(self.runs)
    }
}

/// Union of runs matched by `patterns`, minus runs matched by `unless`.
pub fn descendants(tree: &Tree, patterns: &[Pattern], unless: &[Pattern]) -> Resolution {
    let mut runs = Vec::new();
    let mut unmatched = Vec::new();
    for pattern in patterns {
        let nodes = pattern.matching_nodes(tree);
        if nodes.is_empty() {
            unmatched.push(pattern.to_string());
            continue;
        }
        for node in nodes {
            for run in tree.runs_under(node) {
                if !runs.contains(&run) {
                    runs.push(run);
                }
            }
        }
    }

    let excluded: Vec<NodeId> = unless
        .iter()
        .flat_map(|pattern| pattern.resolve_runs(tree))
        .collect();
    runs.retain(|run| !excluded.contains(run));

    Resolution { runs, unmatched }
}

/// Every run in the tree.
pub fn all_runs(tree: &Tree) -> Vec<NodeId> {
    tree.runs_under(tree.root())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{paths_of, tree_with_runs};

    fn patterns(raw: &[&str]) -> Vec<Pattern> {
        raw.iter()
            .map(|p| Pattern::parse(p).expect("pattern"))
            .collect()
    }

    #[test]
    fn wildcard_minus_exclusion() {
        let tree = tree_with_runs(&["a/b", "a/c", "a/d"]);
        let res = descendants(&tree, &patterns(&["a/*"]), &patterns(&["a/b"]));
        assert_eq!(paths_of(&tree, &res.runs), vec!["a/c", "a/d"]);
        assert!(res.unmatched.is_empty());
    }

    #[test]
    fn union_deduplicates_overlapping_patterns() {
        let tree = tree_with_runs(&["a/b", "a/c", "x/y"]);
        let res = descendants(&tree, &patterns(&["a", "a/c", "x/*"]), &[]);
        assert_eq!(paths_of(&tree, &res.runs), vec!["a/b", "a/c", "x/y"]);
    }

    #[test]
    fn exclusion_of_directory_removes_its_runs() {
        let tree = tree_with_runs(&["a/b/c", "a/b/d", "a/e"]);
        let res = descendants(&tree, &patterns(&["a"]), &patterns(&["a/b"]));
        assert_eq!(paths_of(&tree, &res.runs), vec!["a/e"]);
    }

    #[test]
    fn unmatched_patterns_are_reported() {
        let tree = tree_with_runs(&["a/b"]);
        let res = descendants(&tree, &patterns(&["a/b", "zzz"]), &[]);
        assert_eq!(paths_of(&tree, &res.runs), vec!["a/b"]);
        assert_eq!(res.unmatched, vec!["zzz".to_string()]);

        let res = descendants(&tree, &patterns(&["zzz"]), &[]);
        assert_eq!(
            res.require_runs(),
            Err(RegistryError::NoMatch {
                patterns: vec!["zzz".to_string()]
            })
        );
    }

    #[test]
    fn fully_excluded_result_is_not_an_error() {
        let tree = tree_with_runs(&["a/b"]);
        let res = descendants(&tree, &patterns(&["a"]), &patterns(&["a/b"]));
        assert_eq!(res.require_runs(), Ok(Vec::new()));
    }
}
