//! Sortable data grid
//!
//! Renders rows under a column schema into a retained [`tabledom`] tree and
//! keeps them sorted, either in memory or by re-querying a remote
//! [`DataSource`]. Header activations toggle the sort; only the body is
//! rebuilt when the rows or their order change.

pub mod column;
pub mod compare;
pub mod controller;
pub mod error;
pub mod options;
pub mod row;
pub mod sort;
pub mod source;
pub mod template;

mod table;

pub use column::{CellTemplate, Column, ColumnConfig, Schema, SortType};
pub use compare::{collate, sort_rows, sort_strings, Comparator, TieBreak};
pub use controller::{resolve_sortable_column, SortController};
pub use error::{Error, FetchError, Result, SchemaError};
pub use options::TableOptions;
pub use row::{Row, KEY_FIELD};
pub use sort::{SortOrder, SortSpec, SortState};
pub use source::{DataSource, DateRange, HttpSource, Page, RowQuery, StaticSource};
pub use table::*;
