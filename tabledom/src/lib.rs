pub mod element;
pub mod event;
pub mod hit;
pub mod markup;
pub mod registry;
pub mod tree;

pub use element::{Content, Element, NAME_ATTR};
pub use event::{Event, MouseButton};
pub use hit::resolve_within;
pub use markup::{element_markup, tree_markup};
pub use registry::SubNodes;
pub use tree::{Node, NodeRef, Tree, TreeError, TreeId, TreeResult};
