//! Markup serialization.
//!
//! Produces compact HTML-like text (no insignificant whitespace) for
//! detached elements and for live subtrees. Both paths share one writer,
//! so an element and the subtree mounted from it serialize identically.

use std::fmt::Write;

use indexmap::IndexMap;

use crate::element::{Content, Element, TEXT_TAG};
use crate::tree::{NodeRef, Tree};

/// Serialize a detached element.
pub fn element_markup(element: &Element) -> String {
    let mut out = String::new();
    write_element(&mut out, element);
    out
}

/// Serialize a live node and its subtree. Stale handles produce "".
pub fn tree_markup(tree: &Tree, node: NodeRef) -> String {
    let mut out = String::new();
    write_node(&mut out, tree, node);
    out
}

fn write_element(out: &mut String, element: &Element) {
    let text = match &element.content {
        Content::Text(text) => Some(text.as_str()),
        _ => None,
    };
    if element.tag == TEXT_TAG {
        escape_into(out, text.unwrap_or_default());
        return;
    }
    open_tag(out, &element.tag, &element.classes, &element.attrs);
    if let Some(text) = text {
        escape_into(out, text);
    }
    for child in element.child_elements() {
        write_element(out, child);
    }
    close_tag(out, &element.tag);
}

fn write_node(out: &mut String, tree: &Tree, node: NodeRef) {
    let Some(n) = tree.get(node) else {
        return;
    };
    if n.is_text() {
        escape_into(out, n.text.as_deref().unwrap_or_default());
        return;
    }
    open_tag(out, &n.tag, &n.classes, &n.attrs);
    if let Some(text) = &n.text {
        escape_into(out, text);
    }
    for child in tree.children(node) {
        write_node(out, tree, child);
    }
    close_tag(out, &n.tag);
}

fn open_tag(out: &mut String, tag: &str, classes: &[String], attrs: &IndexMap<String, String>) {
    out.push('<');
    out.push_str(tag);
    if !classes.is_empty() {
        out.push_str(" class=\"");
        escape_into(out, &classes.join(" "));
        out.push('"');
    }
    for (key, value) in attrs {
        let _ = write!(out, " {key}=\"");
        escape_into(out, value);
        out.push('"');
    }
    out.push('>');
}

fn close_tag(out: &mut String, tag: &str) {
    let _ = write!(out, "</{tag}>");
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_text_and_attributes() {
        let element = Element::div()
            .attr("title", "a \"b\"")
            .child(Element::text("1 < 2 & 3"));
        assert_eq!(
            element_markup(&element),
            "<div title=\"a &quot;b&quot;\">1 &lt; 2 &amp; 3</div>"
        );
    }

    #[test]
    fn test_tree_and_element_serialize_alike() {
        let element = Element::div()
            .class("table")
            .class("wide")
            .data("id", "name")
            .child(Element::span().text_content("Name"));
        let tree = Tree::from_element(&element);
        assert_eq!(
            tree_markup(&tree, tree.root().unwrap()),
            element_markup(&element)
        );
        assert_eq!(
            element_markup(&element),
            "<div class=\"table wide\" data-id=\"name\"><span>Name</span></div>"
        );
    }
}
