//! Retained node tree.
//!
//! A [`Tree`] owns every node mounted into it. Callers hold [`NodeRef`]
//! handles, which are plain copyable keys: they stay valid while the node is
//! alive, move with the node when it is re-parented, and stop resolving once
//! the node (or the whole tree) is released.

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use slotmap::{new_key_type, SlotMap};

use crate::element::{Content, Element, TEXT_TAG};

new_key_type! {
    /// Arena key of a node inside one tree.
    pub struct NodeKey;
}

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a tree, distinct for every tree created in the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(u64);

impl TreeId {
    fn next() -> Self {
        Self(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for TreeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tree-{}", self.0)
    }
}

/// Non-owning handle to a node: the owning tree's id plus the arena key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    tree: TreeId,
    key: NodeKey,
}

impl NodeRef {
    pub fn tree(&self) -> TreeId {
        self.tree
    }
}

/// A live node.
#[derive(Debug, Clone)]
pub struct Node {
    pub tag: String,
    pub classes: Vec<String>,
    pub attrs: IndexMap<String, String>,
    pub text: Option<String>,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

impl Node {
    fn from_element(element: &Element) -> Self {
        Self {
            tag: element.tag.clone(),
            classes: element.classes.clone(),
            attrs: element.attrs.clone(),
            text: match &element.content {
                Content::Text(text) => Some(text.clone()),
                _ => None,
            },
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn is_text(&self) -> bool {
        self.tag == TEXT_TAG
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The handle belongs to another tree or its node was removed.
    #[error("stale or foreign node handle")]
    InvalidNode,
    /// Appending would make a node its own ancestor.
    #[error("cannot append a node to itself or one of its descendants")]
    Cycle,
}

pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Debug)]
pub struct Tree {
    id: TreeId,
    nodes: SlotMap<NodeKey, Node>,
    root: Option<NodeKey>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Self {
            id: TreeId::next(),
            nodes: SlotMap::with_key(),
            root: None,
        }
    }

    /// Build a tree whose root is the given element.
    pub fn from_element(element: &Element) -> Self {
        let mut tree = Self::new();
        let root = tree.insert(element);
        tree.root = Some(root.key);
        tree
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn root(&self) -> Option<NodeRef> {
        self.root.map(|key| self.handle(key))
    }

    /// Number of live nodes, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the handle belongs to this tree and its node is alive.
    pub fn is_live(&self, node: NodeRef) -> bool {
        self.key(node).is_ok()
    }

    /// Drop every node. All outstanding handles stop resolving.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    fn handle(&self, key: NodeKey) -> NodeRef {
        NodeRef { tree: self.id, key }
    }

    fn key(&self, node: NodeRef) -> TreeResult<NodeKey> {
        if node.tree == self.id && self.nodes.contains_key(node.key) {
            Ok(node.key)
        } else {
            Err(TreeError::InvalidNode)
        }
    }

    // -------------------------------------------------------------------------
    // Reading
    // -------------------------------------------------------------------------

    pub fn get(&self, node: NodeRef) -> Option<&Node> {
        let key = self.key(node).ok()?;
        self.nodes.get(key)
    }

    pub fn attr(&self, node: NodeRef, key: &str) -> Option<&str> {
        self.get(node)?.attr(key)
    }

    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        let parent = self.get(node)?.parent?;
        Some(self.handle(parent))
    }

    pub fn children(&self, node: NodeRef) -> Vec<NodeRef> {
        self.get(node)
            .map(|n| n.children.iter().map(|&k| self.handle(k)).collect())
            .unwrap_or_default()
    }

    /// The node and all of its descendants, in document (pre-)order.
    pub fn descendants(&self, node: NodeRef) -> Vec<NodeRef> {
        let mut out = Vec::new();
        let Ok(key) = self.key(node) else {
            return out;
        };
        let mut stack = vec![key];
        while let Some(key) = stack.pop() {
            out.push(self.handle(key));
            if let Some(n) = self.nodes.get(key) {
                stack.extend(n.children.iter().rev());
            }
        }
        out
    }

    /// Every node under `node` (inclusive) matching the predicate.
    pub fn find_all(&self, node: NodeRef, pred: impl Fn(&Node) -> bool) -> Vec<NodeRef> {
        self.descendants(node)
            .into_iter()
            .filter(|&n| self.get(n).is_some_and(&pred))
            .collect()
    }

    /// Nearest inclusive ancestor matching the predicate.
    pub fn closest(&self, node: NodeRef, pred: impl Fn(&Node) -> bool) -> Option<NodeRef> {
        let mut current = Some(self.key(node).ok()?);
        while let Some(key) = current {
            let n = self.nodes.get(key)?;
            if pred(n) {
                return Some(self.handle(key));
            }
            current = n.parent;
        }
        None
    }

    /// Whether `node` is `ancestor` or lies beneath it.
    pub fn contains(&self, ancestor: NodeRef, node: NodeRef) -> bool {
        let Ok(ancestor) = self.key(ancestor) else {
            return false;
        };
        let Ok(mut current) = self.key(node) else {
            return false;
        };
        loop {
            if current == ancestor {
                return true;
            }
            match self.nodes.get(current).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Concatenated text of the node and its descendants.
    pub fn text_content(&self, node: NodeRef) -> String {
        self.descendants(node)
            .into_iter()
            .filter_map(|n| self.get(n).and_then(|n| n.text.as_deref()))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Mount an element (recursively) as a detached subtree.
    pub fn insert(&mut self, element: &Element) -> NodeRef {
        let key = self.insert_rec(element, None);
        self.handle(key)
    }

    fn insert_rec(&mut self, element: &Element, parent: Option<NodeKey>) -> NodeKey {
        let mut node = Node::from_element(element);
        node.parent = parent;
        let key = self.nodes.insert(node);
        let children: Vec<NodeKey> = element
            .child_elements()
            .iter()
            .map(|child| self.insert_rec(child, Some(key)))
            .collect();
        if let Some(n) = self.nodes.get_mut(key) {
            n.children = children;
        }
        key
    }

    /// Mount an element and append it as the last child of `parent`.
    pub fn append_element(&mut self, parent: NodeRef, element: &Element) -> TreeResult<NodeRef> {
        let parent_key = self.key(parent)?;
        let key = self.insert_rec(element, Some(parent_key));
        if let Some(p) = self.nodes.get_mut(parent_key) {
            p.children.push(key);
        }
        Ok(self.handle(key))
    }

    /// Append an existing node to `parent`, detaching it from its current
    /// parent first. The node keeps its handle.
    pub fn append_child(&mut self, parent: NodeRef, child: NodeRef) -> TreeResult<()> {
        let parent_key = self.key(parent)?;
        let child_key = self.key(child)?;
        if self.contains(child, parent) {
            return Err(TreeError::Cycle);
        }
        self.unlink(child_key);
        if let Some(c) = self.nodes.get_mut(child_key) {
            c.parent = Some(parent_key);
        }
        if let Some(p) = self.nodes.get_mut(parent_key) {
            p.children.push(child_key);
        }
        if self.root == Some(child_key) {
            self.root = None;
        }
        Ok(())
    }

    /// Unlink a node from its parent without dropping it.
    pub fn detach(&mut self, node: NodeRef) -> TreeResult<()> {
        let key = self.key(node)?;
        self.unlink(key);
        Ok(())
    }

    fn unlink(&mut self, key: NodeKey) {
        let Some(parent) = self.nodes.get_mut(key).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|&c| c != key);
        }
    }

    /// Drop a node and its whole subtree.
    pub fn remove(&mut self, node: NodeRef) -> TreeResult<()> {
        let key = self.key(node)?;
        self.unlink(key);
        self.drop_subtree(key);
        if self.root == Some(key) {
            self.root = None;
        }
        Ok(())
    }

    fn drop_subtree(&mut self, key: NodeKey) {
        let mut stack = vec![key];
        while let Some(key) = stack.pop() {
            if let Some(node) = self.nodes.remove(key) {
                stack.extend(node.children);
            }
        }
    }

    /// Drop every child of `parent` and mount `elements` in their place.
    /// Nothing outside `parent`'s subtree is touched.
    pub fn replace_children(
        &mut self,
        parent: NodeRef,
        elements: &[Element],
    ) -> TreeResult<Vec<NodeRef>> {
        let parent_key = self.key(parent)?;
        let old = self
            .nodes
            .get_mut(parent_key)
            .map(|p| std::mem::take(&mut p.children))
            .unwrap_or_default();
        for child in old {
            self.drop_subtree(child);
        }
        elements
            .iter()
            .map(|element| self.append_element(parent, element))
            .collect()
    }

    pub fn set_attr(
        &mut self,
        node: NodeRef,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> TreeResult<()> {
        let k = self.key(node)?;
        if let Some(n) = self.nodes.get_mut(k) {
            n.attrs.insert(key.into(), value.into());
        }
        Ok(())
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attr(&mut self, node: NodeRef, key: &str) -> TreeResult<Option<String>> {
        let k = self.key(node)?;
        Ok(self
            .nodes
            .get_mut(k)
            .and_then(|n| n.attrs.shift_remove(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Tree, NodeRef) {
        let element = Element::div()
            .attr("id", "root")
            .child(Element::span().attr("id", "a").child(Element::text("x")))
            .child(Element::span().attr("id", "b"));
        let tree = Tree::from_element(&element);
        let root = tree.root().unwrap();
        (tree, root)
    }

    fn by_id(tree: &Tree, id: &str) -> NodeRef {
        let root = tree.root().unwrap();
        tree.find_all(root, |n| n.attr("id") == Some(id))[0]
    }

    #[test]
    fn test_descendants_are_in_document_order() {
        let (tree, root) = sample();
        let ids: Vec<_> = tree
            .descendants(root)
            .into_iter()
            .map(|n| tree.get(n).unwrap().tag.clone())
            .collect();
        assert_eq!(ids, vec!["div", "span", TEXT_TAG, "span"]);
    }

    #[test]
    fn test_append_child_moves_and_keeps_handle() {
        let (mut tree, _) = sample();
        let a = by_id(&tree, "a");
        let b = by_id(&tree, "b");
        let text = tree.children(a)[0];

        tree.append_child(b, text).unwrap();

        assert!(tree.children(a).is_empty());
        assert_eq!(tree.children(b), vec![text]);
        assert_eq!(tree.parent(text), Some(b));
    }

    #[test]
    fn test_append_child_rejects_cycles() {
        let (mut tree, root) = sample();
        let a = by_id(&tree, "a");
        assert_eq!(tree.append_child(a, root), Err(TreeError::Cycle));
    }

    #[test]
    fn test_remove_invalidates_subtree() {
        let (mut tree, _) = sample();
        let a = by_id(&tree, "a");
        let text = tree.children(a)[0];
        tree.remove(a).unwrap();
        assert!(!tree.is_live(a));
        assert!(!tree.is_live(text));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_foreign_handles_do_not_resolve() {
        let (tree, root) = sample();
        let (other, _) = sample();
        assert!(other.get(root).is_none());
        assert!(!other.contains(other.root().unwrap(), root));
        assert!(tree.get(root).is_some());
    }
}
