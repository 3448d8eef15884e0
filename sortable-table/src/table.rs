//! The sortable table widget.

use tabledom::{tree_markup, Element, Event, NodeRef, SubNodes, Tree, TreeError};

use crate::column::{Column, Schema};
use crate::compare::{Comparator, TieBreak};
use crate::controller::{decorate_header, Binding, Route, SortController};
use crate::error::{Error, FetchError, Result};
use crate::options::TableOptions;
use crate::row::Row;
use crate::sort::{SortOrder, SortState};
use crate::source::{DataSource, DateRange, Page, RowQuery};
use crate::template::{self, EMPTY, LOADING};

/// Something a table reports to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    /// The sort applied to the rendered rows changed.
    Sorted { column_id: String, order: SortOrder },
    /// A body row was activated.
    RowActivated {
        key: Option<String>,
        href: Option<String>,
    },
}

/// Outcome of dispatching an event to the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Ignored,
    /// A local sort was applied.
    Sorted(SortState),
    /// The table sorts remotely; fetch `request.query()` and hand the result
    /// to [`SortableTable::complete_fetch`].
    FetchRequired(RemoteRequest),
    RowActivated {
        key: Option<String>,
        href: Option<String>,
    },
}

/// A remote fetch the table is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRequest {
    token: u64,
    sort: SortState,
    query: RowQuery,
}

impl RemoteRequest {
    pub fn token(&self) -> u64 {
        self.token
    }

    /// The sort the table switches to once this request completes.
    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn query(&self) -> &RowQuery {
        &self.query
    }
}

/// Whether a completed fetch was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Current,
    /// A newer request was issued in the meantime; the response was dropped.
    Stale,
}

/// Rendered tree, its sub-node index and the listener bound to it.
#[derive(Debug)]
struct Mounted {
    tree: Tree,
    nodes: SubNodes,
    binding: Binding,
}

impl Mounted {
    /// Bring header, body and empty state in line with `sort` and `body`.
    /// The header cells and the arrow keep their handles.
    fn sync(&mut self, sort: &SortState, body: &[Element]) -> Result<()> {
        decorate_header(&mut self.tree, &mut self.nodes, self.binding.header(), sort)?;
        self.tree.replace_children(self.binding.body(), body)?;
        self.toggle_fragment(EMPTY, body.is_empty(), template::empty_fragment)?;
        Ok(())
    }

    fn toggle_fragment(&mut self, name: &str, show: bool, build: fn() -> Element) -> Result<()> {
        match (self.nodes.get(name), show) {
            (None, true) => {
                let root = self.tree.root().ok_or(TreeError::InvalidNode)?;
                let node = self.tree.append_element(root, &build())?;
                self.nodes.insert(name, node);
            }
            (Some(node), false) => {
                self.nodes.remove(name);
                self.tree.remove(node)?;
            }
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug)]
enum Phase {
    Constructed,
    Rendered(Mounted),
    Destroyed,
}

/// A data grid that renders rows under a column schema and keeps them sorted.
///
/// In local mode every sort is applied in memory. In remote mode (a `url`
/// with `isSortLocally: false`) a sort is a query against a [`DataSource`]
/// and the rows it returns are shown in the order received.
///
/// # Example
///
/// ```
/// use sortable_table::{Column, SortType, SortableTable, TableOptions};
///
/// let columns = vec![
///     Column::new("title", "Name").sortable(SortType::String),
///     Column::new("quantity", "Quantity").sortable(SortType::Number),
/// ];
/// let mut table = SortableTable::new(columns, TableOptions::new()).unwrap();
/// table.render().unwrap();
/// assert!(table.is_empty_state());
/// ```
#[derive(Debug)]
pub struct SortableTable {
    schema: Schema,
    rows: Vec<Row>,
    controller: SortController,
    remote: bool,
    tie_break: TieBreak,
    page: Page,
    range: Option<DateRange>,
    phase: Phase,
    events: Vec<TableEvent>,
    next_token: u64,
    pending: Option<(u64, SortState)>,
}

impl SortableTable {
    /// Create a table. Nothing is rendered until [`render`](Self::render).
    ///
    /// Without `sorted` the table starts sorted ascending on its first
    /// sortable column (unsorted if it has none).
    pub fn new(columns: Vec<Column>, options: TableOptions) -> Result<Self> {
        let schema = Schema::new(columns)?;
        let initial = match &options.sorted {
            Some(spec) => {
                schema.sortable(&spec.id)?;
                SortState::from(spec.clone())
            }
            None => schema
                .first_sortable()
                .map(|c| SortState::sorted_by(c.id.clone(), SortOrder::Asc))
                .unwrap_or_default(),
        };
        let remote = options.sorts_remotely();
        log::debug!(
            "[table] created with {} columns, {} rows, {} sort",
            schema.columns().len(),
            options.data.len(),
            if remote { "remote" } else { "local" }
        );

        Ok(Self {
            schema,
            rows: options.data,
            controller: SortController::new(initial),
            remote,
            tie_break: options.tie_break,
            page: options.page,
            range: options.range,
            phase: Phase::Constructed,
            events: Vec::new(),
            next_token: 0,
            pending: None,
        })
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Build the tree, index its sub-nodes and bind the listener.
    pub fn render(&mut self) -> Result<NodeRef> {
        match self.phase {
            Phase::Constructed => {}
            Phase::Rendered(_) => return Err(Error::AlreadyRendered),
            Phase::Destroyed => return Err(Error::Destroyed),
        }

        let element = template::build_table(&self.schema, self.view()?, self.controller.state());
        let tree = Tree::from_element(&element);
        let root = tree.root().ok_or(TreeError::InvalidNode)?;
        let nodes = SubNodes::index(&tree, root);
        let binding = Binding::bind(&nodes)?;

        let mut mounted = Mounted {
            tree,
            nodes,
            binding,
        };
        mounted.toggle_fragment(EMPTY, self.rows.is_empty(), template::empty_fragment)?;
        mounted.toggle_fragment(LOADING, self.pending.is_some(), template::loading_fragment)?;

        log::debug!("[table] rendered {} rows into {}", self.rows.len(), root.tree());
        self.phase = Phase::Rendered(mounted);
        Ok(root)
    }

    /// Replace the dataset. The current sort is kept and only the body is
    /// rebuilt; an empty dataset switches to the empty state.
    pub fn update(&mut self, rows: Vec<Row>) -> Result<()> {
        self.ensure_alive()?;
        self.rows = rows;
        self.resync()?;
        log::debug!("[table] updated with {} rows", self.rows.len());
        Ok(())
    }

    /// Sort the loaded rows in memory.
    ///
    /// Fails with [`Error::RemoteMode`] on a table that sorts remotely.
    pub fn sort(&mut self, column_id: &str, order: SortOrder) -> Result<()> {
        self.ensure_alive()?;
        if self.remote {
            return Err(Error::RemoteMode);
        }
        self.schema.sortable(column_id)?;
        self.apply_sort(SortState::sorted_by(column_id, order))
    }

    /// Route a pointer event dispatched anywhere in the table's tree.
    pub fn dispatch(&mut self, event: &Event) -> Result<Dispatch> {
        let route = match &self.phase {
            Phase::Constructed => return Err(Error::NotRendered),
            Phase::Destroyed => return Err(Error::Destroyed),
            Phase::Rendered(mounted) => mounted.binding.route(&mounted.tree, event),
        };

        match route {
            Route::Ignored => Ok(Dispatch::Ignored),
            Route::Row { key, href, .. } => {
                log::debug!("[table] row {key:?} activated");
                self.events.push(TableEvent::RowActivated {
                    key: key.clone(),
                    href: href.clone(),
                });
                Ok(Dispatch::RowActivated { key, href })
            }
            Route::Sort { column_id, .. } if self.remote => {
                let from = self.requested_sort().clone();
                let next = SortController::transition(&from, &column_id);
                Ok(Dispatch::FetchRequired(self.request(next)?))
            }
            Route::Sort { column_id, .. } => {
                let next = SortController::transition(self.controller.state(), &column_id);
                self.apply_sort(next.clone())?;
                Ok(Dispatch::Sorted(next))
            }
        }
    }

    /// Release the rendered tree, the sub-node index and the listener.
    ///
    /// Every later call fails with [`Error::Destroyed`]. Destroying twice is
    /// a no-op.
    pub fn destroy(&mut self) {
        if let Phase::Rendered(mounted) = &mut self.phase {
            mounted.nodes.clear();
            mounted.tree.clear();
        }
        if !matches!(self.phase, Phase::Destroyed) {
            log::debug!("[table] destroyed");
        }
        self.phase = Phase::Destroyed;
        self.pending = None;
        self.events.clear();
    }

    // -------------------------------------------------------------------------
    // Remote sorting
    // -------------------------------------------------------------------------

    /// Start a remote sort. The tree shows the loading state until the
    /// request is completed with [`complete_fetch`](Self::complete_fetch).
    pub fn begin_remote_sort(&mut self, column_id: &str, order: SortOrder) -> Result<RemoteRequest> {
        self.ensure_alive()?;
        if !self.remote {
            return Err(Error::LocalMode);
        }
        self.schema.sortable(column_id)?;
        self.request(SortState::sorted_by(column_id, order))
    }

    /// Start a reload of the rows under the latest requested sort.
    pub fn begin_refresh(&mut self) -> Result<RemoteRequest> {
        self.ensure_alive()?;
        if !self.remote {
            return Err(Error::LocalMode);
        }
        let sort = self.requested_sort().clone();
        self.request(sort)
    }

    /// Apply the outcome of a fetch started by this table.
    ///
    /// Only the most recent request is applied; an older one returns
    /// [`Applied::Stale`] and changes nothing. A failed fetch clears the
    /// loading state and leaves header and body as they were.
    pub fn complete_fetch(
        &mut self,
        request: RemoteRequest,
        result: std::result::Result<Vec<Row>, FetchError>,
    ) -> Result<Applied> {
        self.ensure_alive()?;
        if self.pending.as_ref().map(|(token, _)| *token) != Some(request.token) {
            log::warn!("[table] discarding stale response for request {}", request.token);
            return Ok(Applied::Stale);
        }
        self.pending = None;
        if let Phase::Rendered(mounted) = &mut self.phase {
            mounted.toggle_fragment(LOADING, false, template::loading_fragment)?;
        }

        let rows = result.inspect_err(|e| {
            log::warn!("[table] fetch for request {} failed: {e}", request.token);
        })?;
        self.rows = rows;
        self.apply_sort(request.sort)?;
        Ok(Applied::Current)
    }

    /// Fetch rows sorted by `column_id` from `source` and show them.
    pub async fn sort_remote<S>(
        &mut self,
        source: &S,
        column_id: &str,
        order: SortOrder,
    ) -> Result<Applied>
    where
        S: DataSource + ?Sized,
    {
        let request = self.begin_remote_sort(column_id, order)?;
        let result = source.fetch(request.query()).await;
        self.complete_fetch(request, result)
    }

    /// Reload the rows from `source` under the current sort.
    pub async fn refresh<S>(&mut self, source: &S) -> Result<Applied>
    where
        S: DataSource + ?Sized,
    {
        let request = self.begin_refresh()?;
        let result = source.fetch(request.query()).await;
        self.complete_fetch(request, result)
    }

    /// Date range sent with later remote queries.
    pub fn set_range(&mut self, range: DateRange) {
        self.range = Some(range);
    }

    /// Row window sent with later remote queries.
    pub fn set_page(&mut self, page: Page) {
        self.page = page;
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Drain the events reported since the last call.
    pub fn take_events(&mut self) -> Vec<TableEvent> {
        std::mem::take(&mut self.events)
    }

    /// The sort the rendered rows are in.
    pub fn sort_state(&self) -> &SortState {
        self.controller.state()
    }

    /// The sort of the outstanding remote request, if any.
    pub fn pending_sort(&self) -> Option<&SortState> {
        self.pending.as_ref().map(|(_, sort)| sort)
    }

    /// The dataset as supplied, not reordered by local sorting.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn is_remote(&self) -> bool {
        self.remote
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self.phase, Phase::Rendered(_))
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(self.phase, Phase::Destroyed)
    }

    pub fn tree(&self) -> Option<&Tree> {
        match &self.phase {
            Phase::Rendered(mounted) => Some(&mounted.tree),
            _ => None,
        }
    }

    pub fn root(&self) -> Option<NodeRef> {
        self.tree().and_then(Tree::root)
    }

    /// Look up a named sub-node (`header`, `body`, `arrow`, ...).
    pub fn sub_node(&self, name: &str) -> Option<NodeRef> {
        match &self.phase {
            Phase::Rendered(mounted) => mounted.nodes.get(name),
            _ => None,
        }
    }

    /// Serialized markup of the rendered tree.
    pub fn markup(&self) -> Option<String> {
        let tree = self.tree()?;
        Some(tree_markup(tree, tree.root()?))
    }

    pub fn is_empty_state(&self) -> bool {
        self.sub_node(EMPTY).is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.sub_node(LOADING).is_some()
    }

    /// Number of rows currently in the rendered body.
    pub fn body_row_count(&self) -> usize {
        match &self.phase {
            Phase::Rendered(mounted) => mounted.tree.children(mounted.binding.body()).len(),
            _ => 0,
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn ensure_alive(&self) -> Result<()> {
        match self.phase {
            Phase::Destroyed => Err(Error::Destroyed),
            _ => Ok(()),
        }
    }

    fn requested_sort(&self) -> &SortState {
        self.pending_sort().unwrap_or(self.controller.state())
    }

    /// Rows in display order. Remote rows are shown as received.
    fn view(&self) -> Result<Vec<&Row>> {
        let state = self.controller.state();
        match &state.column_id {
            Some(id) if !self.remote => Ok(Comparator::new(&self.schema, id, state.order)?
                .tie_break(self.tie_break)
                .sorted(&self.rows)),
            _ => Ok(self.rows.iter().collect()),
        }
    }

    fn body_elements(&self) -> Result<Vec<Element>> {
        Ok(template::body_rows(&self.schema, self.view()?))
    }

    fn apply_sort(&mut self, sort: SortState) -> Result<()> {
        let changed = self.controller.commit(sort);
        self.resync()?;
        if changed && let Some(spec) = self.controller.state().spec() {
            self.events.push(TableEvent::Sorted {
                column_id: spec.id,
                order: spec.order,
            });
        }
        Ok(())
    }

    fn resync(&mut self) -> Result<()> {
        if !self.is_rendered() {
            return Ok(());
        }
        let body = self.body_elements()?;
        if let Phase::Rendered(mounted) = &mut self.phase {
            mounted.sync(self.controller.state(), &body)?;
        }
        Ok(())
    }

    fn request(&mut self, sort: SortState) -> Result<RemoteRequest> {
        self.next_token += 1;
        let token = self.next_token;
        let query = RowQuery {
            sort: sort.spec(),
            page: self.page,
            range: self.range,
        };
        log::debug!("[table] request {token}: {query:?}");

        if let Phase::Rendered(mounted) = &mut self.phase {
            mounted.toggle_fragment(LOADING, true, template::loading_fragment)?;
        }
        self.pending = Some((token, sort.clone()));
        Ok(RemoteRequest { token, sort, query })
    }
}
