use crate::tree::{Node, NodeRef, Tree};

/// Resolve a delegated event target.
///
/// Walks from `target` up to the nearest node matching `pred` and returns it
/// only if it lies within `scope`. Targets from another tree, removed
/// targets and matches outside the scope all resolve to `None`.
pub fn resolve_within(
    tree: &Tree,
    scope: NodeRef,
    target: NodeRef,
    pred: impl Fn(&Node) -> bool,
) -> Option<NodeRef> {
    let found = tree.closest(target, pred)?;
    if tree.contains(scope, found) {
        Some(found)
    } else {
        log::trace!("[hit] {found:?} matched outside of scope {scope:?}");
        None
    }
}

