//! Error types

mod fetch;
mod schema;

pub use fetch::*;
pub use schema::*;

/// Top-level error for table operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Schema contract violation.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Remote fetch failed; the rendered tree is left as it was.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A sub-node handle no longer resolves in the rendered tree.
    #[error("Rendered tree error: {0}")]
    Tree(#[from] tabledom::TreeError),

    /// The table was used after `destroy()`.
    #[error("Table has been destroyed")]
    Destroyed,

    /// `render()` was called on an already rendered table.
    #[error("Table is already rendered")]
    AlreadyRendered,

    /// The operation needs a rendered tree.
    #[error("Table has not been rendered")]
    NotRendered,

    /// A local sort was requested on a table that sorts remotely.
    #[error("Table sorts remotely; use sort_remote")]
    RemoteMode,

    /// A remote operation was requested on a locally sorted table.
    #[error("Table sorts locally; no remote source is configured")]
    LocalMode,

    /// Options or schema configuration could not be read.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, Error>;
