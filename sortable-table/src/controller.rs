//! Sort controller and event routing.
//!
//! The table listens once, on its own tree. A pointer activation is routed
//! by walking up from the target: a sortable header cell drives the sort
//! state machine, a body row container activates the row, anything else is
//! ignored. Targets from another table never resolve because handles carry
//! their tree's identity.

use tabledom::{resolve_within, Event, NodeRef, SubNodes, Tree, TreeError};

use crate::sort::SortState;
use crate::template::{self, ARROW, BODY, HEADER, ROW_CLASS};

/// Sort state machine: `unsorted`, `sorted_by(id, asc)`, `sorted_by(id, desc)`.
#[derive(Debug, Clone, Default)]
pub struct SortController {
    state: SortState,
}

impl SortController {
    pub fn new(state: SortState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &SortState {
        &self.state
    }

    /// The state activating `column_id` leads to, starting from `from`.
    pub fn transition(from: &SortState, column_id: &str) -> SortState {
        from.toggle(column_id)
    }

    /// Make `state` current. Returns whether it changed.
    pub fn commit(&mut self, state: SortState) -> bool {
        if self.state == state {
            return false;
        }
        log::debug!("[sort] {:?} -> {:?}", self.state, state);
        self.state = state;
        true
    }
}

/// Where an event landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// A sortable header cell was activated.
    Sort { cell: NodeRef, column_id: String },
    /// A body row container was activated.
    Row {
        node: NodeRef,
        key: Option<String>,
        href: Option<String>,
    },
    /// Not an activation, or not on anything the table reacts to.
    Ignored,
}

/// The table's delegated listener, bound to its header and body sub-nodes.
///
/// Lives and dies with the rendered tree it was bound to.
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    header: NodeRef,
    body: NodeRef,
}

impl Binding {
    pub fn bind(nodes: &SubNodes) -> Result<Self, TreeError> {
        Ok(Self {
            header: nodes.get(HEADER).ok_or(TreeError::InvalidNode)?,
            body: nodes.get(BODY).ok_or(TreeError::InvalidNode)?,
        })
    }

    pub fn header(&self) -> NodeRef {
        self.header
    }

    pub fn body(&self) -> NodeRef {
        self.body
    }

    pub fn route(&self, tree: &Tree, event: &Event) -> Route {
        if !event.is_activation() {
            log::trace!("[sort] ignoring {event:?}");
            return Route::Ignored;
        }
        let target = event.target();

        if let Some((cell, column_id)) = resolve_sortable_column(tree, self.header, target) {
            return Route::Sort { cell, column_id };
        }

        if let Some(node) = resolve_row(tree, self.body, target) {
            return Route::Row {
                node,
                key: tree.attr(node, "data-key").map(str::to_string),
                href: tree.attr(node, "href").map(str::to_string),
            };
        }

        log::trace!("[sort] {target:?} is outside of any sortable cell or row");
        Route::Ignored
    }
}

/// Resolve an event target to the sortable header cell it lies in.
///
/// Returns the cell and its column id, or `None` when the target is not
/// inside a sortable cell of `header` (including targets from other trees).
pub fn resolve_sortable_column(
    tree: &Tree,
    header: NodeRef,
    target: NodeRef,
) -> Option<(NodeRef, String)> {
    let cell = resolve_within(tree, header, target, |n| {
        n.attr("data-sortable") == Some("true") && n.attr("data-id").is_some()
    })?;
    let column_id = tree.attr(cell, "data-id")?.to_string();
    Some((cell, column_id))
}

/// Resolve an event target to the body row container it lies in.
pub fn resolve_row(tree: &Tree, body: NodeRef, target: NodeRef) -> Option<NodeRef> {
    resolve_within(tree, body, target, |n| n.has_class(ROW_CLASS))
}

/// Mirror `state` onto the header in place.
///
/// Clears `data-order` from every other cell, sets it on the active one and
/// moves the arrow there. The arrow is created once if the tree has none;
/// after that the same node is re-parented, never rebuilt.
pub fn decorate_header(
    tree: &mut Tree,
    nodes: &mut SubNodes,
    header: NodeRef,
    state: &SortState,
) -> Result<(), TreeError> {
    let mut active = None;
    for cell in tree.children(header) {
        let Some(id) = tree.attr(cell, "data-id") else {
            continue;
        };
        if state.is_active(id) {
            active = Some(cell);
            tree.set_attr(cell, "data-order", state.order.as_str())?;
        } else {
            tree.remove_attr(cell, "data-order")?;
        }
    }

    let arrow = nodes.get(ARROW).filter(|&arrow| tree.is_live(arrow));
    match (active, arrow) {
        (Some(cell), Some(arrow)) => {
            if tree.parent(arrow) != Some(cell) {
                tree.append_child(cell, arrow)?;
            }
        }
        (Some(cell), None) => {
            let arrow = tree.append_element(cell, &template::sort_arrow())?;
            nodes.insert(ARROW, arrow);
        }
        (None, Some(arrow)) => tree.detach(arrow)?,
        (None, None) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tabledom::{Element, MouseButton};

    use super::*;
    use crate::column::{Column, Schema, SortType};
    use crate::sort::SortOrder;

    fn mounted(sort: &SortState) -> (Tree, SubNodes) {
        let schema = Schema::new(vec![
            Column::new("title", "Name").sortable(SortType::String),
            Column::new("qty", "Quantity").sortable(SortType::Number),
            Column::new("notes", "Notes"),
        ])
        .unwrap();
        let rows: Vec<crate::Row> =
            serde_json::from_value(serde_json::json!([{"id": "a", "title": "A", "qty": 1}])).unwrap();
        let tree = Tree::from_element(&template::build_table(&schema, &rows, sort));
        let nodes = SubNodes::index(&tree, tree.root().unwrap());
        (tree, nodes)
    }

    fn cell(tree: &Tree, header: NodeRef, id: &str) -> NodeRef {
        tree.find_all(header, |n| n.attr("data-id") == Some(id))[0]
    }

    #[test]
    fn test_routes_header_title_to_its_column() {
        let (tree, nodes) = mounted(&SortState::unsorted());
        let binding = Binding::bind(&nodes).unwrap();
        let qty = cell(&tree, binding.header(), "qty");
        let title_span = tree.children(qty)[0];

        assert_eq!(
            binding.route(&tree, &Event::pointer_down(title_span)),
            Route::Sort {
                cell: qty,
                column_id: "qty".into()
            }
        );
    }

    #[test]
    fn test_non_sortable_cells_and_other_buttons_are_ignored() {
        let (tree, nodes) = mounted(&SortState::unsorted());
        let binding = Binding::bind(&nodes).unwrap();
        let notes = cell(&tree, binding.header(), "notes");
        let qty = cell(&tree, binding.header(), "qty");

        assert_eq!(binding.route(&tree, &Event::pointer_down(notes)), Route::Ignored);
        assert_eq!(
            binding.route(
                &tree,
                &Event::PointerDown {
                    target: qty,
                    button: MouseButton::Right
                }
            ),
            Route::Ignored
        );
    }

    #[test]
    fn test_routes_row_activation() {
        let (tree, nodes) = mounted(&SortState::unsorted());
        let binding = Binding::bind(&nodes).unwrap();
        let row = tree.children(binding.body())[0];
        let first_cell = tree.children(row)[0];

        assert_eq!(
            binding.route(&tree, &Event::pointer_down(first_cell)),
            Route::Row {
                node: row,
                key: Some("a".into()),
                href: Some("/products/a".into())
            }
        );
    }

    #[test]
    fn test_decorate_moves_the_same_arrow() {
        let (mut tree, mut nodes) = mounted(&SortState::sorted_by("title", SortOrder::Asc));
        let header = nodes.get(HEADER).unwrap();
        let arrow = nodes.get(ARROW).unwrap();
        let title = cell(&tree, header, "title");
        let qty = cell(&tree, header, "qty");

        let state = SortState::sorted_by("qty", SortOrder::Asc);
        decorate_header(&mut tree, &mut nodes, header, &state).unwrap();

        assert_eq!(nodes.get(ARROW), Some(arrow));
        assert_eq!(tree.parent(arrow), Some(qty));
        assert_eq!(tree.attr(qty, "data-order"), Some("asc"));
        assert_eq!(tree.attr(title, "data-order"), None);
    }

    #[test]
    fn test_decorate_creates_arrow_once_when_unsorted() {
        let (mut tree, mut nodes) = mounted(&SortState::unsorted());
        let header = nodes.get(HEADER).unwrap();
        assert!(nodes.get(ARROW).is_none());

        let state = SortState::sorted_by("title", SortOrder::Desc);
        decorate_header(&mut tree, &mut nodes, header, &state).unwrap();
        let arrow = nodes.get(ARROW).unwrap();

        decorate_header(&mut tree, &mut nodes, header, &state.toggle("qty")).unwrap();
        assert_eq!(nodes.get(ARROW), Some(arrow));
        assert_eq!(
            tree.find_all(header, |n| n.attr(tabledom::NAME_ATTR) == Some(ARROW)),
            vec![arrow]
        );
    }

    #[test]
    fn test_binding_requires_header_and_body() {
        let tree = Tree::from_element(&Element::div().name(HEADER));
        let nodes = SubNodes::index(&tree, tree.root().unwrap());
        assert_eq!(Binding::bind(&nodes).unwrap_err(), TreeError::InvalidNode);
    }

    #[test]
    fn test_commit_reports_changes() {
        let mut controller = SortController::default();
        let next = SortController::transition(controller.state(), "qty");
        assert!(controller.commit(next.clone()));
        assert!(!controller.commit(next));
        assert_eq!(controller.state(), &SortState::sorted_by("qty", SortOrder::Asc));
    }
}
