//! Command-line arguments and the table configuration file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Deserialize;
use simplelog::LevelFilter;
use sortable_table::{Column, ColumnConfig, DateRange, SortOrder, TableOptions};

use crate::CliError;

/// Backend the configured `url` is resolved against when it is relative.
pub const DEFAULT_BACKEND: &str = "https://course-js.javascript.ru/";

#[derive(Debug, Parser)]
#[command(name = "sortable-table", about = "Render a sortable data table")]
pub struct Args {
    /// Table configuration (columns plus options); defaults to the
    /// platform config directory's table.json
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// JSON array of rows to load instead of the configured data
    #[arg(long, short)]
    pub rows: Option<PathBuf>,

    /// Column to sort by
    #[arg(long, short)]
    pub sort: Option<String>,

    /// Sort direction
    #[arg(long, short, default_value = "asc", value_parser = parse_order)]
    pub order: SortOrder,

    /// Fetch rows from this endpoint and let it do the sorting
    #[arg(long, short)]
    pub url: Option<String>,

    /// Start of the date range sent to the endpoint (RFC 3339)
    #[arg(long, requires = "to")]
    pub from: Option<DateTime<Utc>>,

    /// End of the date range sent to the endpoint (RFC 3339)
    #[arg(long, requires = "from")]
    pub to: Option<DateTime<Utc>>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Log file; defaults to latest.log in the platform cache directory
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,
}

impl Args {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn range(&self) -> Option<DateRange> {
        Some(DateRange {
            from: self.from?,
            to: self.to?,
        })
    }
}

fn parse_order(s: &str) -> Result<SortOrder, String> {
    SortOrder::parse(s).ok_or_else(|| format!("expected `asc` or `desc`, got `{s}`"))
}

/// Contents of a table configuration file.
///
/// ```json
/// {
///   "columns": [
///     {"id": "title", "title": "Name", "sortable": true, "sortType": "string"},
///     {"id": "quantity", "title": "Quantity", "sortable": true, "sortType": "number"}
///   ],
///   "url": "api/dashboard/bestsellers",
///   "isSortLocally": false
/// }
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    pub columns: Vec<ColumnConfig>,
    /// Base URL a relative `url` is resolved against.
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(flatten)]
    pub options: TableOptions,
}

impl TableConfig {
    pub fn from_json(json: &str) -> Result<Self, CliError> {
        serde_json::from_str(json)
            .map_err(|e| sortable_table::Error::Config(e.to_string()).into())
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        log::info!("Loading table configuration from {}", path.display());
        Self::from_json(&read(path)?)
    }

    pub fn columns(&self) -> Vec<Column> {
        self.columns.iter().cloned().map(Column::from).collect()
    }

    pub fn backend(&self) -> &str {
        self.backend.as_deref().unwrap_or(DEFAULT_BACKEND)
    }

    /// Fold the command-line overrides into the options.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(url) = &args.url {
            self.options = std::mem::take(&mut self.options).remote(url.clone());
        }
        if let Some(range) = args.range() {
            self.options.range = Some(range);
        }
    }
}

pub fn read(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use sortable_table::{SortSpec, SortType};

    use super::*;

    const CONFIG: &str = r#"{
        "columns": [
            {"id": "images", "title": "Image"},
            {"id": "title", "title": "Name", "sortable": true, "sortType": "string"},
            {"id": "sales", "sortable": true, "sortType": "number"}
        ],
        "url": "api/dashboard/bestsellers",
        "isSortLocally": false,
        "sorted": {"id": "sales", "order": "desc"}
    }"#;

    #[test]
    fn test_config_file() {
        let config = TableConfig::from_json(CONFIG).unwrap();
        let columns = config.columns();

        assert_eq!(columns.len(), 3);
        assert!(!columns[0].sortable);
        assert_eq!(columns[1].sort_type, SortType::String);
        assert_eq!(columns[2].title, "sales");
        assert!(config.options.sorts_remotely());
        assert_eq!(
            config.options.sorted,
            Some(SortSpec::new("sales", SortOrder::Desc))
        );
        assert_eq!(config.backend(), DEFAULT_BACKEND);
    }

    #[test]
    fn test_config_requires_columns() {
        assert!(TableConfig::from_json(r#"{"url": "api/rows"}"#).is_err());
    }

    #[test]
    fn test_args_override_config() {
        let args = Args::try_parse_from([
            "sortable-table",
            "--url",
            "https://example.com/rows",
            "--from",
            "2024-01-01T00:00:00Z",
            "--to",
            "2024-02-01T00:00:00Z",
            "--sort",
            "title",
            "--order",
            "desc",
        ])
        .unwrap();
        let mut config = TableConfig::from_json(r#"{"columns": [{"id": "title"}]}"#).unwrap();
        config.apply_args(&args);

        assert_eq!(args.order, SortOrder::Desc);
        assert!(config.options.sorts_remotely());
        assert_eq!(config.options.url.as_deref(), Some("https://example.com/rows"));
        assert!(config.options.range.is_some());
    }

    #[test]
    fn test_args_reject_bad_order_and_half_ranges() {
        assert!(Args::try_parse_from(["sortable-table", "--order", "up"]).is_err());
        assert!(Args::try_parse_from(["sortable-table", "--from", "2024-01-01T00:00:00Z"]).is_err());
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["sortable-table"]).unwrap();
        assert_eq!(args.order, SortOrder::Asc);
        assert_eq!(args.log_level, LevelFilter::Info);
        assert_eq!(args.timeout(), Duration::from_secs(30));
        assert!(args.range().is_none());
    }
}
