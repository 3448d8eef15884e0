use indexmap::IndexMap;

use super::Content;

/// Tag used for bare text nodes.
pub const TEXT_TAG: &str = "#text";

/// Attribute carrying a node's logical sub-node name.
pub const NAME_ATTR: &str = "data-element";

/// A detached markup element.
///
/// Elements are plain values: building one has no side effects and two
/// elements built from the same inputs compare equal. They become live,
/// addressable nodes once mounted into a [`Tree`](crate::Tree).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    /// Attributes in insertion order (serialization keeps this order).
    pub attrs: IndexMap<String, String>,
    pub content: Content,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            classes: Vec::new(),
            attrs: IndexMap::new(),
            content: Content::None,
        }
    }

    pub fn div() -> Self {
        Self::new("div")
    }

    pub fn span() -> Self {
        Self::new("span")
    }

    pub fn p() -> Self {
        Self::new("p")
    }

    pub fn button() -> Self {
        Self::new("button").attr("type", "button")
    }

    pub fn anchor(href: impl Into<String>) -> Self {
        Self::new("a").attr("href", href)
    }

    /// A bare text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Content::Text(content.into()),
            ..Self::new(TEXT_TAG)
        }
    }

    pub fn is_text(&self) -> bool {
        self.tag == TEXT_TAG
    }

    // Attributes

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Set a `data-*` attribute.
    pub fn data(self, key: &str, value: impl Into<String>) -> Self {
        self.attr(format!("data-{key}"), value)
    }

    /// Tag this element with a logical sub-node name.
    pub fn name(self, name: impl Into<String>) -> Self {
        self.attr(NAME_ATTR, name)
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn get_data(&self, key: &str) -> Option<&str> {
        self.get_attr(&format!("data-{key}"))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    // Content

    /// Replace the content with text.
    pub fn text_content(mut self, text: impl Into<String>) -> Self {
        self.content = Content::Text(text.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        match &mut self.content {
            Content::Children(children) => children.push(child),
            _ => self.content = Content::Children(vec![child]),
        }
        self
    }

    pub fn children(mut self, new_children: impl IntoIterator<Item = Element>) -> Self {
        match &mut self.content {
            Content::Children(children) => children.extend(new_children),
            _ => self.content = Content::Children(new_children.into_iter().collect()),
        }
        self
    }

    /// Direct children, empty for text or empty content.
    pub fn child_elements(&self) -> &[Element] {
        match &self.content {
            Content::Children(children) => children,
            _ => &[],
        }
    }
}
