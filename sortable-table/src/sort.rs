//! Sort direction and sort state.

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl SortOrder {
    /// The opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Value used for the `data-order` attribute and the `_order` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested sort: column id plus direction (`{id, order}` in options).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub id: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(id: impl Into<String>, order: SortOrder) -> Self {
        Self {
            id: id.into(),
            order,
        }
    }
}

/// Current sort state of a table.
///
/// `column_id == None` is the unsorted state. When set, the id always names
/// a sortable column of the table's schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    pub column_id: Option<String>,
    pub order: SortOrder,
}

impl SortState {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn sorted_by(column_id: impl Into<String>, order: SortOrder) -> Self {
        Self {
            column_id: Some(column_id.into()),
            order,
        }
    }

    /// Whether `column_id` is the active column.
    pub fn is_active(&self, column_id: &str) -> bool {
        self.column_id.as_deref() == Some(column_id)
    }

    /// State after activating `column_id`: the active column flips its
    /// order, any other column starts ascending.
    pub fn toggle(&self, column_id: &str) -> Self {
        let order = if self.is_active(column_id) {
            self.order.toggled()
        } else {
            SortOrder::Asc
        };
        Self::sorted_by(column_id, order)
    }

    pub fn spec(&self) -> Option<SortSpec> {
        self.column_id
            .as_ref()
            .map(|id| SortSpec::new(id.clone(), self.order))
    }
}

impl From<SortSpec> for SortState {
    fn from(spec: SortSpec) -> Self {
        Self::sorted_by(spec.id, spec.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_same_column_flips_order() {
        let state = SortState::sorted_by("qty", SortOrder::Asc);
        let state = state.toggle("qty");
        assert_eq!(state, SortState::sorted_by("qty", SortOrder::Desc));
        assert_eq!(state.toggle("qty"), SortState::sorted_by("qty", SortOrder::Asc));
    }

    #[test]
    fn test_toggle_other_column_starts_ascending() {
        let state = SortState::sorted_by("qty", SortOrder::Desc);
        assert_eq!(state.toggle("name"), SortState::sorted_by("name", SortOrder::Asc));
        assert_eq!(
            SortState::unsorted().toggle("name"),
            SortState::sorted_by("name", SortOrder::Asc)
        );
    }

    #[test]
    fn test_order_parses_its_own_output() {
        for order in [SortOrder::Asc, SortOrder::Desc] {
            assert_eq!(SortOrder::parse(order.as_str()), Some(order));
        }
        assert_eq!(SortOrder::parse("up"), None);
    }
}
