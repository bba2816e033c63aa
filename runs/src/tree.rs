//! Arena-backed run tree and its persisted document form.
//!
//! Nodes live in a slot vector addressed by [`NodeId`]. Each node stores its
//! parent id and an ordered list of child ids; the root sits in slot 0 and is
//! never freed. Freed slots are not reused, so ids stay stable for the lifetime
//! of a loaded tree.

use serde::{Deserialize, Serialize};

use crate::core::path::RunPath;
use crate::core::types::RunMetadata;
use crate::error::RegistryError;

/// Current on-disk document version.
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    metadata: Option<RunMetadata>,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn metadata(&self) -> Option<&RunMetadata> {
        self.metadata.as_ref()
    }
}

#[derive(Debug, Clone)]
pub struct Tree {
    slots: Vec<Option<Node>>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Self {
            slots: vec![Some(Node {
                name: String::new(),
                parent: None,
                children: Vec::new(),
                metadata: None,
            })],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Borrow a live node.
    ///
    /// # Panics
    /// Panics if `id` was freed; ids must not outlive the mutation that freed them.
    pub fn node(&self, id: NodeId) -> &Node {
        match &self.slots[id.0] {
            Some(node) => node,
            None => panic!("node {id:?} was freed"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match &mut self.slots[id.0] {
            Some(node) => node,
            None => panic!("node {id:?} was freed"),
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slots.get(id.0).is_some_and(Option::is_some)
    }

    /// Number of live nodes, excluding the root.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.node(self.root()).children.is_empty()
    }

    pub fn is_run(&self, id: NodeId) -> bool {
        self.node(id).metadata.is_some()
    }

    pub fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|&child| self.node(child).name == name)
    }

    pub fn resolve_segments(&self, segments: &[String]) -> Option<NodeId> {
        segments
            .iter()
            .try_fold(self.root(), |current, name| self.child(current, name))
    }

    pub fn resolve(&self, path: &RunPath) -> Option<NodeId> {
        self.resolve_segments(path.segments())
    }

    /// Path from the root to `id`; `None` for the root itself.
    pub fn path_of(&self, id: NodeId) -> Option<RunPath> {
        let mut segments = Vec::new();
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            segments.push(self.node(current).name.clone());
            current = parent;
        }
        if segments.is_empty() {
            return None;
        }
        segments.reverse();
        Some(RunPath::from_segments(segments))
    }

    pub fn metadata_mut(&mut self, id: NodeId) -> Option<&mut RunMetadata> {
        self.node_mut(id).metadata.as_mut()
    }

    /// Strip the metadata off `id`, turning a run into a plain directory.
    pub fn take_metadata(&mut self, id: NodeId) -> Option<RunMetadata> {
        self.node_mut(id).metadata.take()
    }

    /// Insert a new child; fails if `parent` already has a child named `name`.
    pub fn insert(
        &mut self,
        parent: NodeId,
        name: &str,
        metadata: Option<RunMetadata>,
    ) -> Result<NodeId, RegistryError> {
        if self.child(parent, name).is_some() {
            return Err(RegistryError::PathExists {
                path: self.child_path(parent, name),
            });
        }
        let id = NodeId(self.slots.len());
        self.slots.push(Some(Node {
            name: name.to_string(),
            parent: Some(parent),
            children: Vec::new(),
            metadata,
        }));
        self.node_mut(parent).children.push(id);
        Ok(id)
    }

    /// Walk `segments` from the root, creating missing directories.
    pub fn ensure_dirs(&mut self, segments: &[String]) -> NodeId {
        let mut current = self.root();
        for name in segments {
            current = match self.child(current, name) {
                Some(existing) => existing,
                None => {
                    let id = NodeId(self.slots.len());
                    self.slots.push(Some(Node {
                        name: name.clone(),
                        parent: Some(current),
                        children: Vec::new(),
                        metadata: None,
                    }));
                    self.node_mut(current).children.push(id);
                    id
                }
            };
        }
        current
    }

    /// Unlink `id` from its parent, keeping its subtree. Returns the former parent.
    pub fn detach(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.node_mut(id).parent.take()?;
        self.node_mut(parent).children.retain(|&child| child != id);
        Some(parent)
    }

    /// Link a detached node under `parent` as `name`.
    pub fn attach(&mut self, id: NodeId, parent: NodeId, name: &str) -> Result<(), RegistryError> {
        if self.child(parent, name).is_some() {
            return Err(RegistryError::PathExists {
                path: self.child_path(parent, name),
            });
        }
        let node = self.node_mut(id);
        node.name = name.to_string();
        node.parent = Some(parent);
        self.node_mut(parent).children.push(id);
        Ok(())
    }

    /// Release the slots of a detached subtree.
    pub fn free(&mut self, id: NodeId) {
        for node in self.preorder(id) {
            self.slots[node.0] = None;
        }
    }

    /// Remove dead ancestors starting at `start`: stop at the root or at the
    /// first node that still has children or metadata. Returns how many nodes
    /// were removed.
    pub fn prune_upward(&mut self, start: NodeId) -> usize {
        let mut current = start;
        let mut removed = 0;
        while current != self.root() {
            let node = self.node(current);
            if !node.children.is_empty() || node.metadata.is_some() {
                break;
            }
            let Some(parent) = self.detach(current) else {
                break;
            };
            self.free(current);
            removed += 1;
            current = parent;
        }
        removed
    }

    /// `id` and all its descendants, parents before children.
    pub fn preorder(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.node(current).children.iter().rev().copied());
        }
        out
    }

    /// Every run (metadata-bearing node) in the subtree rooted at `id`.
    pub fn runs_under(&self, id: NodeId) -> Vec<NodeId> {
        self.preorder(id)
            .into_iter()
            .filter(|&node| self.is_run(node))
            .collect()
    }

    fn child_path(&self, parent: NodeId, name: &str) -> String {
        match self.path_of(parent) {
            Some(path) => format!("{path}/{name}"),
            None => name.to_string(),
        }
    }

    pub fn to_document(&self) -> TreeDocument {
        TreeDocument {
            version: DOCUMENT_VERSION,
            children: self.child_documents(self.root()),
        }
    }

    fn child_documents(&self, id: NodeId) -> Vec<NodeDocument> {
        self.node(id)
            .children
            .iter()
            .map(|&child| {
                let node = self.node(child);
                NodeDocument {
                    name: node.name.clone(),
                    metadata: node.metadata.clone(),
                    children: self.child_documents(child),
                }
            })
            .collect()
    }

    /// Build a tree from a document. Callers validate invariants first.
    pub fn from_document(doc: &TreeDocument) -> Self {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.load_children(root, &doc.children);
        tree
    }

    fn load_children(&mut self, parent: NodeId, children: &[NodeDocument]) {
        for child in children {
            let id = NodeId(self.slots.len());
            self.slots.push(Some(Node {
                name: child.name.clone(),
                parent: Some(parent),
                children: Vec::new(),
                metadata: child.metadata.clone(),
            }));
            self.node_mut(parent).children.push(id);
            self.load_children(id, &child.children);
        }
    }
}

/// Persisted registry: the root is implicit and holds `children`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDocument {
    pub version: u32,
    #[serde(default)]
    pub children: Vec<NodeDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RunMetadata>,
    #[serde(default)]
    pub children: Vec<NodeDocument>,
}

impl Default for TreeDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            children: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{metadata, tree_with_runs};

    fn path(raw: &str) -> RunPath {
        RunPath::parse(raw).expect("path")
    }

    #[test]
    fn ensure_dirs_reuses_existing_nodes() {
        let mut tree = Tree::new();
        let first = tree.ensure_dirs(&path("a/b").segments().to_vec());
        let second = tree.ensure_dirs(&path("a/b").segments().to_vec());
        assert_eq!(first, second);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.path_of(first), Some(path("a/b")));
    }

    #[test]
    fn insert_rejects_duplicate_sibling() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.insert(root, "a", Some(metadata("x"))).expect("insert");
        let err = tree.insert(root, "a", None).expect_err("duplicate");
        assert_eq!(
            err,
            RegistryError::PathExists {
                path: "a".to_string()
            }
        );
    }

    #[test]
    fn prune_upward_stops_at_run_ancestor() {
        let mut tree = tree_with_runs(&["a", "a/b/c"]);
        let c = tree.resolve(&path("a/b/c")).expect("c");
        let b = tree.detach(c).expect("parent");
        tree.free(c);
        assert_eq!(tree.prune_upward(b), 1);
        assert!(tree.resolve(&path("a")).is_some());
        assert!(tree.resolve(&path("a/b")).is_none());
    }

    #[test]
    fn prune_upward_never_removes_root() {
        let mut tree = Tree::new();
        let root = tree.root();
        assert_eq!(tree.prune_upward(root), 0);
        assert!(tree.contains(root));
    }

    #[test]
    fn document_round_trip_preserves_child_order() {
        let tree = tree_with_runs(&["z/run", "a/run", "m"]);
        let doc = tree.to_document();
        let names: Vec<&str> = doc.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
        assert_eq!(Tree::from_document(&doc).to_document(), doc);
    }

    #[test]
    fn runs_under_lists_runs_in_tree_order() {
        let tree = tree_with_runs(&["a/b", "a/c/d", "a/e"]);
        let a = tree.resolve(&path("a")).expect("a");
        let paths: Vec<String> = tree
            .runs_under(a)
            .into_iter()
            .filter_map(|id| tree.path_of(id))
            .map(|p| p.to_string())
            .collect();
        assert_eq!(paths, vec!["a/b", "a/c/d", "a/e"]);
    }
}
