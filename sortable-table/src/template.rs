//! Table markup.
//!
//! Pure builders: the same schema, rows and sort state always produce the
//! same element tree. Named sub-nodes carry `data-element` so the lifecycle
//! can index them once and address them by name afterwards.

use serde_json::Value;
use tabledom::Element;

use crate::column::{Column, Schema};
use crate::row::{row_key, value_text, Row};
use crate::sort::SortState;

/// Header row.
pub const HEADER: &str = "header";
/// Body container whose children are the data rows.
pub const BODY: &str = "body";
/// Sort direction arrow inside the active header cell.
pub const ARROW: &str = "arrow";
/// Loading indicator fragment.
pub const LOADING: &str = "loading";
/// Empty-state fragment.
pub const EMPTY: &str = "emptyPlaceholder";

pub const TABLE_CLASS: &str = "sortable-table";
pub const ROW_CLASS: &str = "sortable-table__row";
pub const CELL_CLASS: &str = "sortable-table__cell";

static NULL: Value = Value::Null;

/// The whole table: header plus body, rows in the given order.
pub fn build_table<'r>(
    schema: &Schema,
    rows: impl IntoIterator<Item = &'r Row>,
    sort: &SortState,
) -> Element {
    Element::div()
        .class(TABLE_CLASS)
        .child(header(schema, sort))
        .child(body(schema, rows))
}

pub fn header(schema: &Schema, sort: &SortState) -> Element {
    Element::div()
        .name(HEADER)
        .class("sortable-table__header")
        .class(ROW_CLASS)
        .children(schema.columns().iter().map(|c| header_cell(c, sort)))
}

/// One header cell. Only the active column gets `data-order` and the arrow.
pub fn header_cell(column: &Column, sort: &SortState) -> Element {
    let cell = Element::div()
        .class(CELL_CLASS)
        .data("id", column.id.as_str())
        .data("sortable", column.sortable.to_string())
        .child(Element::span().text_content(column.title.as_str()));

    if sort.is_active(&column.id) {
        cell.data("order", sort.order.as_str()).child(sort_arrow())
    } else {
        cell
    }
}

pub fn sort_arrow() -> Element {
    Element::span()
        .name(ARROW)
        .class("sortable-table__sort-arrow")
        .child(Element::span().class("sort-arrow"))
}

pub fn body<'r>(schema: &Schema, rows: impl IntoIterator<Item = &'r Row>) -> Element {
    Element::div()
        .name(BODY)
        .class("sortable-table__body")
        .children(body_rows(schema, rows))
}

pub fn body_rows<'r>(schema: &Schema, rows: impl IntoIterator<Item = &'r Row>) -> Vec<Element> {
    rows.into_iter().map(|row| body_row(schema, row)).collect()
}

/// A row container linking to the row's detail view.
pub fn body_row(schema: &Schema, row: &Row) -> Element {
    let container = match row_key(row) {
        Some(key) => Element::anchor(format!("/products/{key}"))
            .class(ROW_CLASS)
            .data("key", key),
        None => Element::new("a").class(ROW_CLASS),
    };
    container.children(schema.columns().iter().map(|c| cell(c, row)))
}

pub fn cell(column: &Column, row: &Row) -> Element {
    let value = row.get(&column.id);
    match &column.template {
        Some(template) => template(value.unwrap_or(&NULL)),
        None => Element::div()
            .class(CELL_CLASS)
            .text_content(value.map(value_text).unwrap_or_default()),
    }
}

pub fn loading_fragment() -> Element {
    Element::div()
        .name(LOADING)
        .class("loading-line")
        .class("sortable-table__loading-line")
}

pub fn empty_fragment() -> Element {
    Element::div()
        .name(EMPTY)
        .class("sortable-table__empty-placeholder")
        .child(
            Element::div()
                .child(Element::p().text_content("No products satisfies your filter criteria"))
                .child(
                    Element::button()
                        .class("button-primary-outline")
                        .text_content("Reset all filters"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tabledom::element::find_named;
    use tabledom::element_markup;

    use super::*;
    use crate::column::SortType;
    use crate::sort::SortOrder;

    fn schema() -> Schema {
        Schema::new(vec![
            Column::new("images", "Image").template(|value| {
                let src = value[0]["url"].as_str().unwrap_or_default().to_string();
                Element::div()
                    .class(CELL_CLASS)
                    .child(Element::new("img").class("sortable-table-image").attr("src", src))
            }),
            Column::new("title", "Name").sortable(SortType::String),
            Column::new("price", "Price").sortable(SortType::Number),
        ])
        .unwrap()
    }

    fn data() -> Vec<Row> {
        serde_json::from_value(json!([
            {"id": "soap", "title": "Soap", "price": 3, "images": [{"url": "soap.png"}]},
            {"id": "rope", "title": "Rope", "price": 12, "images": []}
        ]))
        .unwrap()
    }

    #[test]
    fn test_header_decorates_active_column_only() {
        let sort = SortState::sorted_by("price", SortOrder::Desc);
        let header = header(&schema(), &sort);
        let cells = header.child_elements();

        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0].get_data("sortable"), Some("false"));
        assert_eq!(cells[1].get_data("order"), None);
        assert_eq!(cells[2].get_data("order"), Some("desc"));
        assert!(find_named(&cells[2], ARROW).is_some());
        assert!(find_named(&cells[1], ARROW).is_none());
    }

    #[test]
    fn test_unsorted_header_has_no_arrow() {
        let header = header(&schema(), &SortState::unsorted());
        assert!(find_named(&header, ARROW).is_none());
    }

    #[test]
    fn test_body_rows_use_templates_and_default_cells() {
        let data = data();
        let rows = body_rows(&schema(), &data);

        assert_eq!(rows.len(), 2);
        assert_eq!(
            element_markup(&rows[0]),
            "<a class=\"sortable-table__row\" href=\"/products/soap\" data-key=\"soap\">\
             <div class=\"sortable-table__cell\"><img class=\"sortable-table-image\" src=\"soap.png\"></img></div>\
             <div class=\"sortable-table__cell\">Soap</div>\
             <div class=\"sortable-table__cell\">3</div></a>"
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let data = data();
        let sort = SortState::sorted_by("title", SortOrder::Asc);
        assert_eq!(
            build_table(&schema(), &data, &sort),
            build_table(&schema(), &data, &sort)
        );
    }

    #[test]
    fn test_fragments_are_named() {
        assert_eq!(loading_fragment().get_attr(tabledom::NAME_ATTR), Some(LOADING));
        assert!(find_named(&empty_fragment(), EMPTY).is_some());
    }
}
