//! Table construction options.

use serde::Deserialize;

use crate::compare::TieBreak;
use crate::error::Error;
use crate::row::Row;
use crate::sort::{SortOrder, SortSpec};
use crate::source::{DateRange, Page};

/// Options bag accepted at construction.
///
/// Deserializes from camelCase JSON; every field is optional:
///
/// ```json
/// {
///   "url": "api/dashboard/bestsellers",
///   "isSortLocally": false,
///   "sorted": {"id": "title", "order": "asc"},
///   "page": {"start": 0, "end": 30}
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableOptions {
    /// Initial rows.
    pub data: Vec<Row>,
    /// Initial sort; defaults to the first sortable column, ascending.
    pub sorted: Option<SortSpec>,
    /// Remote endpoint the rows come from.
    pub url: Option<String>,
    /// Sort the loaded rows in memory instead of re-querying the source.
    pub is_sort_locally: bool,
    /// Date range sent with remote queries.
    pub range: Option<DateRange>,
    /// Row window sent with remote queries.
    pub page: Page,
    /// String comparison tie-break rule.
    pub tie_break: TieBreak,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            sorted: None,
            url: None,
            is_sort_locally: true,
            range: None,
            page: Page::default(),
            tie_break: TieBreak::default(),
        }
    }
}

impl TableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn data(mut self, rows: Vec<Row>) -> Self {
        self.data = rows;
        self
    }

    pub fn sorted(mut self, id: impl Into<String>, order: SortOrder) -> Self {
        self.sorted = Some(SortSpec::new(id, order));
        self
    }

    /// Delegate sorting to the source at `url`.
    pub fn remote(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self.is_sort_locally = false;
        self
    }

    pub fn range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }

    pub fn tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Whether sorting is delegated to the remote source.
    pub fn sorts_remotely(&self) -> bool {
        self.url.is_some() && !self.is_sort_locally
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = TableOptions::from_json("{}").unwrap();
        assert!(options.is_sort_locally);
        assert!(!options.sorts_remotely());
        assert_eq!(options.page, Page { start: 0, end: 30 });
        assert_eq!(options.tie_break, TieBreak::Legacy);
    }

    #[test]
    fn test_remote_options_from_json() {
        let options = TableOptions::from_json(
            r#"{
                "url": "api/dashboard/bestsellers",
                "isSortLocally": false,
                "sorted": {"id": "title", "order": "desc"},
                "range": {"from": "2024-01-01T00:00:00Z", "to": "2024-02-01T00:00:00Z"},
                "tieBreak": "collation",
                "data": [{"id": "soap", "title": "Soap"}]
            }"#,
        )
        .unwrap();

        assert!(options.sorts_remotely());
        assert_eq!(options.sorted, Some(SortSpec::new("title", SortOrder::Desc)));
        assert_eq!(options.tie_break, TieBreak::Collation);
        assert_eq!(options.data.len(), 1);
        assert!(options.range.is_some());
    }

    #[test]
    fn test_url_alone_still_sorts_locally() {
        let options = TableOptions::from_json(r#"{"url": "api/rows"}"#).unwrap();
        assert!(!options.sorts_remotely());
    }

    #[test]
    fn test_invalid_json_is_a_config_error() {
        assert!(matches!(
            TableOptions::from_json(r#"{"sorted": 5}"#),
            Err(Error::Config(_))
        ));
    }
}
