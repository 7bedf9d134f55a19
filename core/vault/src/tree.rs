//! In-memory mirror of the vault directory tree.
//!
//! The vault tree holds the structure last observed on disk plus the
//! transient expansion flags the presentation layer toggles. Paths are the
//! identity key of every node.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use pdfvault_common::{Error, NodeKind, Result};

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// A node in the vault tree.
///
/// Fields are private so that `child.path == parent.path / child.name`
/// can only change through [`VaultTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultNode {
    path: PathBuf,
    name: String,
    kind: NodeKind,
    children: Vec<VaultNode>,
    expanded: bool,
}

impl VaultNode {
    fn new(path: PathBuf, name: String, kind: NodeKind) -> Self {
        Self {
            path,
            name,
            kind,
            children: Vec::new(),
            expanded: false,
        }
    }

    /// Create the root node. It displays the full vault path.
    pub fn root(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self::new(path, name, NodeKind::Root)
    }

    /// Create a folder node.
    pub fn folder(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = display_name(&path);
        Self::new(path, name, NodeKind::Folder)
    }

    /// Create a PDF file node.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = display_name(&path);
        Self::new(path, name, NodeKind::File)
    }

    /// Absolute path of this node.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node kind.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Children in display order.
    pub fn children(&self) -> &[VaultNode] {
        &self.children
    }

    /// Whether the node is shown expanded.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Check if this is a PDF file.
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    /// Check if this node can hold children (root or folder).
    pub fn is_directory(&self) -> bool {
        self.kind.is_container()
    }

    /// Get child by name.
    pub fn get_child(&self, name: &str) -> Option<&VaultNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Append a child node.
    ///
    /// # Errors
    /// - This node is a file
    /// - The child's path is not directly below this node
    /// - A child with the same path already exists
    pub fn add_child(&mut self, node: VaultNode) -> Result<()> {
        if self.is_file() {
            return Err(Error::InvalidInput("Cannot add child to file".to_string()));
        }
        if node.path.parent() != Some(self.path.as_path()) {
            return Err(Error::InvalidInput(format!(
                "{} is not a child of {}",
                node.path.display(),
                self.path.display()
            )));
        }
        if self.children.iter().any(|c| c.path == node.path) {
            return Err(Error::InvalidInput(format!(
                "Child '{}' already exists",
                node.name
            )));
        }

        self.children.push(node);
        Ok(())
    }

    /// Remove a direct child by path.
    pub fn remove_child(&mut self, path: &Path) -> Result<VaultNode> {
        let index = self
            .children
            .iter()
            .position(|c| c.path == path)
            .ok_or_else(|| Error::NotFound(format!("Child '{}' not found", path.display())))?;
        Ok(self.children.remove(index))
    }

    /// Find a node in this subtree.
    pub fn find(&self, path: &Path) -> Option<&VaultNode> {
        if self.path == path {
            return Some(self);
        }
        if !path.starts_with(&self.path) {
            return None;
        }
        self.children
            .iter()
            .find(|c| path.starts_with(&c.path))
            .and_then(|c| c.find(path))
    }

    fn find_mut(&mut self, path: &Path) -> Option<&mut VaultNode> {
        if self.path == path {
            return Some(self);
        }
        if !path.starts_with(&self.path) {
            return None;
        }
        self.children
            .iter_mut()
            .find(|c| path.starts_with(&c.path))
            .and_then(|c| c.find_mut(path))
    }

    pub(crate) fn expand(&mut self) {
        self.expanded = true;
    }

    /// Move this node to `new_path`, re-deriving every descendant path.
    fn relocate(&mut self, new_path: PathBuf) {
        self.name = display_name(&new_path);
        self.path = new_path;
        for child in &mut self.children {
            let child_path = self.path.join(&child.name);
            child.relocate(child_path);
        }
    }

    fn collect_expanded(&self, out: &mut HashSet<PathBuf>) {
        if self.expanded {
            out.insert(self.path.clone());
        }
        for child in &self.children {
            child.collect_expanded(out);
        }
    }

    fn apply_expanded(&mut self, expanded: &HashSet<PathBuf>) {
        self.expanded = self.is_directory() && expanded.contains(&self.path);
        for child in &mut self.children {
            child.apply_expanded(expanded);
        }
    }
}

/// Depth-first, pre-order iterator over a subtree.
pub struct Iter<'a> {
    stack: Vec<&'a VaultNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a VaultNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// In-memory mirror of the vault directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultTree {
    /// Root node.
    root: VaultNode,
}

impl VaultTree {
    /// Create a tree around an already built root node.
    pub fn new(root: VaultNode) -> Self {
        Self { root }
    }

    /// Get the root node.
    pub fn root(&self) -> &VaultNode {
        &self.root
    }

    /// Consume the tree, returning its root node.
    pub fn into_root(self) -> VaultNode {
        self.root
    }

    /// Vault root path.
    pub fn root_path(&self) -> &Path {
        &self.root.path
    }

    /// Whether `path` is the vault root.
    pub fn is_root(&self, path: &Path) -> bool {
        self.root.path == path
    }

    /// Look up a node by absolute path.
    pub fn find_node(&self, path: &Path) -> Option<&VaultNode> {
        self.root.find(path)
    }

    /// Get the parent node of `path`.
    pub fn parent_of(&self, path: &Path) -> Option<&VaultNode> {
        if self.is_root(path) {
            return None;
        }
        path.parent().and_then(|p| self.find_node(p))
    }

    /// Check if a path exists in the tree.
    pub fn exists(&self, path: &Path) -> bool {
        self.find_node(path).is_some()
    }

    fn node_mut(&mut self, path: &Path) -> Result<&mut VaultNode> {
        self.root
            .find_mut(path)
            .ok_or_else(|| Error::NotFound(format!("Path not found: {}", path.display())))
    }

    /// Append `node` to the children of `parent`.
    pub fn insert(&mut self, parent: &Path, node: VaultNode) -> Result<()> {
        self.node_mut(parent)?.add_child(node)
    }

    /// Detach the node at `path` from its parent.
    ///
    /// # Errors
    /// - `path` is the root
    /// - `path` is not in the tree
    pub fn remove(&mut self, path: &Path) -> Result<VaultNode> {
        if self.is_root(path) {
            return Err(Error::InvalidInput("Cannot remove root".to_string()));
        }
        let parent = path
            .parent()
            .ok_or_else(|| Error::InvalidInput("Root has no parent".to_string()))?;
        self.node_mut(parent)?.remove_child(path)
    }

    /// Give the node at `path` a new name in the same directory.
    ///
    /// Descendant paths are re-derived from the new prefix.
    pub fn rename(&mut self, path: &Path, new_name: &str) -> Result<PathBuf> {
        if self.is_root(path) {
            return Err(Error::InvalidInput("Cannot rename root".to_string()));
        }
        let parent = path
            .parent()
            .ok_or_else(|| Error::InvalidInput("Root has no parent".to_string()))?;
        let new_path = parent.join(new_name);

        let node = self.node_mut(path)?;
        node.relocate(new_path.clone());
        Ok(new_path)
    }

    /// Set the expansion flag of a root or folder node.
    pub fn set_expanded(&mut self, path: &Path, expanded: bool) -> Result<()> {
        let node = self.node_mut(path)?;
        if !node.is_directory() {
            return Err(Error::InvalidInput(format!(
                "{} is not a folder",
                path.display()
            )));
        }
        node.expanded = expanded;
        Ok(())
    }

    /// Collect the paths of every expanded node.
    pub fn snapshot_expanded(&self) -> HashSet<PathBuf> {
        let mut out = HashSet::new();
        self.root.collect_expanded(&mut out);
        out
    }

    /// Re-apply a snapshot taken with [`snapshot_expanded`](Self::snapshot_expanded).
    ///
    /// Afterwards exactly the snapshot paths still present in the tree are
    /// expanded; stale paths are ignored.
    pub fn restore_expanded(&mut self, expanded: &HashSet<PathBuf>) {
        self.root.apply_expanded(expanded);
    }

    /// Swap in a freshly scanned root, returning the old one.
    pub fn replace_root(&mut self, root: VaultNode) -> VaultNode {
        std::mem::replace(&mut self.root, root)
    }

    /// Depth-first, pre-order traversal starting at the root.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: vec![&self.root],
        }
    }

    /// Count the PDF files in the tree.
    pub fn count_files(&self) -> usize {
        self.iter().filter(|n| n.is_file()).count()
    }

    /// Count the folders in the tree, excluding the root.
    pub fn count_folders(&self) -> usize {
        self.iter().filter(|n| n.kind() == NodeKind::Folder).count()
    }
}
