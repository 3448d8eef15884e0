//! Column schema errors

/// Contract violations detected against the column schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The schema has no columns.
    #[error("Column schema is empty")]
    NoColumns,

    /// Two columns share an id.
    #[error("Duplicate column id: {0}")]
    DuplicateColumn(String),

    /// A column id that is not part of the schema.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Sorting was requested on a column that is not sortable.
    #[error("Column is not sortable: {0}")]
    NotSortable(String),
}
