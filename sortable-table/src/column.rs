//! Column schema.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tabledom::Element;

use crate::error::SchemaError;

/// How a column's values are compared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum SortType {
    /// Numeric comparison.
    #[default]
    Number,
    /// Locale-aware, case-insensitive string comparison.
    String,
    /// A sort type this engine does not know; compared numerically.
    Custom(String),
}

impl From<String> for SortType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "number" => Self::Number,
            "string" => Self::String,
            _ => Self::Custom(s),
        }
    }
}

/// Renders one cell from the raw field value.
pub type CellTemplate = Arc<dyn Fn(&Value) -> Element + Send + Sync>;

/// A column definition.
#[derive(Clone)]
pub struct Column {
    /// Unique identifier, also the row field the column displays.
    pub id: String,
    /// Header text.
    pub title: String,
    pub sortable: bool,
    pub sort_type: SortType,
    /// Custom cell renderer; the default cell wraps the value as text.
    pub template: Option<CellTemplate>,
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("sortable", &self.sortable)
            .field("sort_type", &self.sort_type)
            .field("template", &self.template.as_ref().map(|_| "..."))
            .finish()
    }
}

impl Column {
    /// Create a non-sortable column.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            sortable: false,
            sort_type: SortType::default(),
            template: None,
        }
    }

    /// Make the column sortable with the given sort type.
    pub fn sortable(self, sort_type: SortType) -> Self {
        Self {
            sortable: true,
            ..self.sort_type(sort_type)
        }
    }

    /// Set the sort type without changing whether the column is sortable.
    pub fn sort_type(mut self, sort_type: SortType) -> Self {
        self.sort_type = sort_type;
        self
    }

    pub fn template(mut self, template: impl Fn(&Value) -> Element + Send + Sync + 'static) -> Self {
        self.template = Some(Arc::new(template));
        self
    }
}

/// Column as it appears in a JSON schema file (no templates).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub sort_type: SortType,
}

impl From<ColumnConfig> for Column {
    fn from(config: ColumnConfig) -> Self {
        let title = config.title.unwrap_or_else(|| config.id.clone());
        let column = Column::new(config.id, title).sort_type(config.sort_type);
        Self {
            sortable: config.sortable,
            ..column
        }
    }
}

/// A validated, immutable column schema.
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Validate a column list: at least one column, ids unique.
    pub fn new(columns: Vec<Column>) -> Result<Self, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::NoColumns);
        }
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.id.as_str()) {
                return Err(SchemaError::DuplicateColumn(column.id.clone()));
            }
        }
        Ok(Self { columns })
    }

    pub fn from_configs(configs: Vec<ColumnConfig>) -> Result<Self, SchemaError> {
        Self::new(configs.into_iter().map(Column::from).collect())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn get(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn first_sortable(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.sortable)
    }

    /// Look up a column that sorting may target.
    pub fn sortable(&self, id: &str) -> Result<&Column, SchemaError> {
        let column = self
            .get(id)
            .ok_or_else(|| SchemaError::UnknownColumn(id.to_string()))?;
        if !column.sortable {
            return Err(SchemaError::NotSortable(id.to_string()));
        }
        Ok(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = Schema::new(vec![Column::new("a", "A"), Column::new("a", "Again")]).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateColumn("a".into()));
    }

    #[test]
    fn test_rejects_empty_schema() {
        assert_eq!(Schema::new(vec![]).unwrap_err(), SchemaError::NoColumns);
    }

    #[test]
    fn test_sortable_lookup() {
        let schema = Schema::new(vec![
            Column::new("images", "Image"),
            Column::new("title", "Name").sortable(SortType::String),
        ])
        .unwrap();

        assert_eq!(schema.first_sortable().unwrap().id, "title");
        assert!(schema.sortable("title").is_ok());
        assert_eq!(
            schema.sortable("images").unwrap_err(),
            SchemaError::NotSortable("images".into())
        );
        assert_eq!(
            schema.sortable("price").unwrap_err(),
            SchemaError::UnknownColumn("price".into())
        );
    }

    #[test]
    fn test_column_config_from_json() {
        let configs: Vec<ColumnConfig> = serde_json::from_str(
            r#"[
                {"id": "title", "title": "Name", "sortable": true, "sortType": "string"},
                {"id": "sales", "sortable": true, "sortType": "currency"},
                {"id": "images"}
            ]"#,
        )
        .unwrap();
        let schema = Schema::from_configs(configs).unwrap();
        let columns = schema.columns();

        assert_eq!(columns[0].sort_type, SortType::String);
        assert_eq!(columns[1].sort_type, SortType::Custom("currency".into()));
        assert_eq!(columns[1].title, "sales");
        assert!(!columns[2].sortable);
    }

    #[test]
    fn test_config_keeps_sort_type_of_unsortable_column() {
        let config: ColumnConfig =
            serde_json::from_str(r#"{"id": "title", "sortType": "string"}"#).unwrap();
        let column = Column::from(config);

        assert!(!column.sortable);
        assert_eq!(column.sort_type, SortType::String);
        assert!(!Column::new("qty", "Qty").sort_type(SortType::String).sortable);
    }
}
