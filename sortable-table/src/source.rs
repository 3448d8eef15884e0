//! Remote row sources.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::FetchError;
use crate::row::Row;
use crate::sort::SortSpec;

/// Row window requested from the source (`_start`..`_end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub start: usize,
    pub end: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self { start: 0, end: 30 }
    }
}

/// Date range filter (`from` / `to`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// What to ask the source for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowQuery {
    pub sort: Option<SortSpec>,
    pub page: Page,
    pub range: Option<DateRange>,
}

impl RowQuery {
    /// Query parameters in the order they are sent.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(6);
        if let Some(sort) = &self.sort {
            params.push(("_sort", sort.id.clone()));
            params.push(("_order", sort.order.as_str().to_string()));
        }
        params.push(("_start", self.page.start.to_string()));
        params.push(("_end", self.page.end.to_string()));
        if let Some(range) = &self.range {
            params.push(("from", range.from.to_rfc3339_opts(SecondsFormat::Millis, true)));
            params.push(("to", range.to.to_rfc3339_opts(SecondsFormat::Millis, true)));
        }
        params
    }

    /// Apply the query to `base`, replacing any parameters it already sets
    /// and keeping the rest.
    pub fn apply(&self, base: &Url) -> Url {
        let params = self.params();
        let mut url = base.clone();
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !params.iter().any(|(name, _)| *name == key.as_ref()))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .extend_pairs(params);
        url
    }
}

/// Source of rows for a table that delegates sorting.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use sortable_table::{DataSource, FetchError, Row, RowQuery};
///
/// struct Fixed(Vec<Row>);
///
/// #[async_trait]
/// impl DataSource for Fixed {
///     async fn fetch(&self, _query: &RowQuery) -> Result<Vec<Row>, FetchError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch the rows matching `query`, already in the requested order.
    async fn fetch(&self, query: &RowQuery) -> Result<Vec<Row>, FetchError>;
}

/// A source that always returns the same rows.
///
/// Useful for testing or for data that is loaded once up front.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    rows: Vec<Row>,
}

impl StaticSource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl DataSource for StaticSource {
    async fn fetch(&self, _query: &RowQuery) -> Result<Vec<Row>, FetchError> {
        Ok(self.rows.clone())
    }
}

/// Fetches rows over HTTP from a JSON endpoint returning an array.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: Url,
    http_client: Client,
    timeout: Option<Duration>,
}

impl HttpSource {
    /// Source for an absolute endpoint URL.
    pub fn new(url: &str) -> Result<Self, FetchError> {
        let url = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        Ok(Self {
            url,
            http_client: Client::new(),
            timeout: None,
        })
    }

    /// Source for `path` resolved against a backend base URL.
    pub fn with_backend(backend: &str, path: &str) -> Result<Self, FetchError> {
        let base =
            Url::parse(backend).map_err(|e| FetchError::InvalidUrl(format!("{backend}: {e}")))?;
        let url = base
            .join(path)
            .map_err(|e| FetchError::InvalidUrl(format!("{path}: {e}")))?;
        Ok(Self {
            url,
            http_client: Client::new(),
            timeout: None,
        })
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    /// The full URL a query is sent to.
    pub fn url_for(&self, query: &RowQuery) -> Url {
        query.apply(&self.url)
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch(&self, query: &RowQuery) -> Result<Vec<Row>, FetchError> {
        let url = self.url_for(query);
        log::debug!("[source] GET {url}");

        let mut request = self.http_client.get(url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::http(status.as_u16(), body));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| FetchError::parse_with_body(e.to_string(), body.clone()))?;
        rows_from_json(value)
    }
}

/// Interpret a JSON document as a row sequence.
pub fn rows_from_json(value: Value) -> Result<Vec<Row>, FetchError> {
    let Value::Array(items) = value else {
        return Err(FetchError::NotArray(json_type(&value)));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(row) => Ok(row),
            other => Err(FetchError::NotArray(json_type(&other))),
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::sort::SortOrder;

    fn query() -> RowQuery {
        RowQuery {
            sort: Some(SortSpec::new("title", SortOrder::Desc)),
            page: Page::default(),
            range: Some(DateRange {
                from: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                to: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            }),
        }
    }

    #[test]
    fn test_query_parameters() {
        let source = HttpSource::with_backend(
            "https://course-js.javascript.ru/",
            "/api/dashboard/bestsellers",
        )
        .unwrap();
        assert_eq!(
            source.url_for(&query()).as_str(),
            "https://course-js.javascript.ru/api/dashboard/bestsellers\
             ?_sort=title&_order=desc&_start=0&_end=30\
             &from=2024-01-01T00%3A00%3A00.000Z&to=2024-02-01T00%3A00%3A00.000Z"
        );
    }

    #[test]
    fn test_query_replaces_existing_parameters() {
        let source = HttpSource::new("https://example.com/rows?_sort=price&embed=category").unwrap();
        let query = RowQuery {
            sort: Some(SortSpec::new("title", SortOrder::Asc)),
            page: Page { start: 30, end: 60 },
            range: None,
        };
        assert_eq!(
            source.url_for(&query).as_str(),
            "https://example.com/rows?embed=category&_sort=title&_order=asc&_start=30&_end=60"
        );
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            HttpSource::new("not a url"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_rows_from_json() {
        let rows = rows_from_json(json!([{"id": 1}, {"id": 2}])).unwrap();
        assert_eq!(rows.len(), 2);

        assert!(matches!(
            rows_from_json(json!({"rows": []})),
            Err(FetchError::NotArray("object"))
        ));
        assert!(matches!(
            rows_from_json(json!([{"id": 1}, 2])),
            Err(FetchError::NotArray("number"))
        ));
    }

    #[tokio::test]
    async fn test_static_source_returns_its_rows() {
        let rows = rows_from_json(json!([{"id": 1}])).unwrap();
        let source = StaticSource::new(rows.clone());
        assert_eq!(source.fetch(&query()).await.unwrap(), rows);
    }
}
