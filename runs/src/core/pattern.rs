//! Path patterns: slash-delimited segment matchers evaluated against the tree.

use std::fmt;
use std::str::FromStr;

use crate::error::RegistryError;
use crate::tree::{NodeId, Tree};

/// A single segment within a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentMatcher {
    /// Exact literal match, e.g. `lr-sweep`
    Literal(String),
    /// Bare `*`: any single segment
    Wildcard,
    /// Segment containing `*` or `?`, e.g. `seed-?`
    Glob(String),
}

impl SegmentMatcher {
    fn parse(segment: &str) -> Self {
        if segment == "*" {
            SegmentMatcher::Wildcard
        } else if segment.contains(['*', '?']) {
            SegmentMatcher::Glob(segment.to_string())
        } else {
            SegmentMatcher::Literal(segment.to_string())
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            SegmentMatcher::Literal(literal) => literal == name,
            SegmentMatcher::Wildcard => true,
            SegmentMatcher::Glob(pattern) => glob_match(pattern, name),
        }
    }
}

impl fmt::Display for SegmentMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentMatcher::Literal(s) | SegmentMatcher::Glob(s) => f.write_str(s),
            SegmentMatcher::Wildcard => f.write_str("*"),
        }
    }
}

/// A parsed pattern. The empty pattern denotes the root, i.e. every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    segments: Vec<SegmentMatcher>,
}

impl Pattern {
    pub fn parse(raw: &str) -> Result<Self, RegistryError> {
        let trimmed = raw.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(RegistryError::InvalidPattern {
                pattern: raw.to_string(),
                reason: "pattern is empty".to_string(),
            });
        }
        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            if segment.is_empty() {
                return Err(RegistryError::InvalidPattern {
                    pattern: raw.to_string(),
                    reason: "empty segment".to_string(),
                });
            }
            segments.push(SegmentMatcher::parse(segment));
        }
        Ok(Self { segments })
    }

    /// Pattern matching the root, whose subtree holds every run.
    pub fn everything() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn segments(&self) -> &[SegmentMatcher] {
        &self.segments
    }

    /// Nodes at depth `segments.len()` whose path matches segment by segment,
    /// in tree order.
    pub fn matching_nodes(&self, tree: &Tree) -> Vec<NodeId> {
        let mut frontier = vec![tree.root()];
        for matcher in &self.segments {
            frontier = frontier
                .into_iter()
                .flat_map(|id| tree.node(id).children().iter().copied())
                .filter(|&child| matcher.matches(tree.node(child).name()))
                .collect();
            if frontier.is_empty() {
                break;
            }
        }
        frontier
    }

    /// Runs denoted by this pattern: each matched run plus every run below a
    /// matched node.
    pub fn resolve_runs(&self, tree: &Tree) -> Vec<NodeId> {
        let mut runs = Vec::new();
        for node in self.matching_nodes(tree) {
            for run in tree.runs_under(node) {
                if !runs.contains(&run) {
                    runs.push(run);
                }
            }
        }
        runs
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("*");
        }
        let parts: Vec<String> = self.segments.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join("/"))
    }
}

impl FromStr for Pattern {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::parse(s)
    }
}

/// Shell-style matcher supporting `*` and `?` within a single segment.
fn glob_match(pattern: &str, text: &str) -> bool {
    let (p, t): (Vec<char>, Vec<char>) = (pattern.chars().collect(), text.chars().collect());
    let (mut pi, mut ti) = (0usize, 0usize);
    let mut star_pi: Option<usize> = None;
    let mut star_ti = 0usize;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == t[ti] || p[pi] == '?') {
            pi += 1;
            ti += 1;
            continue;
        }
        if pi < p.len() && p[pi] == '*' {
            star_pi = Some(pi);
            pi += 1;
            star_ti = ti;
            continue;
        }
        if let Some(sp) = star_pi {
            pi = sp + 1;
            star_ti += 1;
            ti = star_ti;
            continue;
        }
        return false;
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{paths_of, tree_with_runs};

    fn pattern(raw: &str) -> Pattern {
        Pattern::parse(raw).expect("pattern")
    }

    #[test]
    fn parse_classifies_segments() {
        let p = pattern("a/*/seed-?");
        assert_eq!(
            p.segments(),
            [
                SegmentMatcher::Literal("a".to_string()),
                SegmentMatcher::Wildcard,
                SegmentMatcher::Glob("seed-?".to_string()),
            ]
        );
        assert_eq!(p.to_string(), "a/*/seed-?");
    }

    #[test]
    fn glob_match_handles_star_and_question() {
        assert!(glob_match("lr-*", "lr-0.1"));
        assert!(glob_match("*", ""));
        assert!(glob_match("s?ed", "seed"));
        assert!(!glob_match("s?ed", "sed"));
        assert!(!glob_match("lr-*", "bs-32"));
    }

    #[test]
    fn wildcard_matches_one_depth_only() {
        let tree = tree_with_runs(&["a/b", "a/c/d", "e"]);
        let nodes = pattern("*/c").matching_nodes(&tree);
        assert_eq!(paths_of(&tree, &nodes), vec!["a/c"]);
    }

    #[test]
    fn internal_node_resolves_to_all_runs_below() {
        let tree = tree_with_runs(&["a/b", "a/c/d", "a/c/e", "f"]);
        assert_eq!(
            paths_of(&tree, &pattern("a").resolve_runs(&tree)),
            vec!["a/b", "a/c/d", "a/c/e"]
        );
        assert_eq!(
            paths_of(&tree, &pattern("a/c/d").resolve_runs(&tree)),
            vec!["a/c/d"]
        );
    }

    #[test]
    fn unmatched_pattern_resolves_to_nothing() {
        let tree = tree_with_runs(&["a/b"]);
        assert!(pattern("a/zzz").matching_nodes(&tree).is_empty());
        assert!(pattern("a/b/c").resolve_runs(&tree).is_empty());
    }

    #[test]
    fn everything_resolves_all_runs() {
        let tree = tree_with_runs(&["a/b", "c"]);
        assert_eq!(
            paths_of(&tree, &Pattern::everything().resolve_runs(&tree)),
            vec!["a/b", "c"]
        );
    }
}
