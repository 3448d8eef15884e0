mod content;
mod node;

pub use content::Content;
pub use node::{Element, NAME_ATTR, TEXT_TAG};

/// Find the first element (pre-order) carrying the given logical name.
pub fn find_named<'a>(root: &'a Element, name: &str) -> Option<&'a Element> {
    if root.get_attr(NAME_ATTR) == Some(name) {
        return Some(root);
    }

    for child in root.child_elements() {
        if let Some(found) = find_named(child, name) {
            return Some(found);
        }
    }

    None
}
