use std::collections::{HashMap, HashSet};

use crate::element::NAME_ATTR;
use crate::tree::{NodeRef, Tree};

/// Index of the named sub-nodes of a tree (`data-element="name"`).
///
/// Built by a single walk; afterwards nodes are addressed by name only.
/// A name that occurs more than once is left out of the index entirely.
#[derive(Debug, Default, Clone)]
pub struct SubNodes {
    nodes: HashMap<String, NodeRef>,
}

impl SubNodes {
    pub fn index(tree: &Tree, root: NodeRef) -> Self {
        let mut nodes = HashMap::new();
        let mut duplicates = HashSet::new();

        for node in tree.descendants(root) {
            let Some(name) = tree.attr(node, NAME_ATTR) else {
                continue;
            };
            if duplicates.contains(name) {
                continue;
            }
            if nodes.remove(name).is_some() {
                log::warn!("[subnodes] duplicate sub-node name {name:?}, omitting it");
                duplicates.insert(name.to_string());
                continue;
            }
            nodes.insert(name.to_string(), node);
        }

        log::debug!("[subnodes] indexed {} named nodes", nodes.len());
        Self { nodes }
    }

    pub fn get(&self, name: &str) -> Option<NodeRef> {
        self.nodes.get(name).copied()
    }

    /// Register a node attached after indexing. Returns the handle it replaced.
    pub fn insert(&mut self, name: impl Into<String>, node: NodeRef) -> Option<NodeRef> {
        self.nodes.insert(name.into(), node)
    }

    pub fn remove(&mut self, name: &str) -> Option<NodeRef> {
        self.nodes.remove(name)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
