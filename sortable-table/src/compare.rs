//! Row comparator.
//!
//! Dispatches on the column's [`SortType`]:
//!
//! - `Number` (and unknown types): loose numeric comparison. Values without
//!   a numeric value sort after every number and tie with each other.
//! - `String`: Russian/English collation. Cyrillic letters sort before
//!   other letters. Case-insensitive at primary strength, `ё` ties with `е`
//!   until the secondary level, uppercase before lowercase at the tertiary
//!   level.
//!
//! The direction multiplier is applied last, so `Desc` is the exact reverse
//! of `Asc` and ties keep their input order either way (the sort is stable).

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::column::{Column, Schema, SortType};
use crate::error::SchemaError;
use crate::row::{value_number, value_text, Row};
use crate::sort::SortOrder;

/// How strings whose leading characters differ only by case are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// The uppercase leading character wins outright, whatever follows it
    /// (`"Bz"` sorts before `"ba"`).
    #[default]
    Legacy,
    /// Plain collation: case only decides once the strings are otherwise
    /// equal (`"ba"` sorts before `"Bz"`).
    Collation,
}

/// Compares rows on one column in one direction.
#[derive(Debug, Clone, Copy)]
pub struct Comparator<'a> {
    column: &'a Column,
    order: SortOrder,
    tie_break: TieBreak,
}

impl<'a> Comparator<'a> {
    /// Comparator for a sortable column of `schema`.
    pub fn new(schema: &'a Schema, column_id: &str, order: SortOrder) -> Result<Self, SchemaError> {
        Ok(Self::for_column(schema.sortable(column_id)?, order))
    }

    pub fn for_column(column: &'a Column, order: SortOrder) -> Self {
        Self {
            column,
            order,
            tie_break: TieBreak::default(),
        }
    }

    pub fn tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn compare(&self, a: &Row, b: &Row) -> Ordering {
        let field = self.column.id.as_str();
        let raw = match self.column.sort_type {
            SortType::String => compare_text(
                &field_text(a.get(field)),
                &field_text(b.get(field)),
                self.tie_break,
            ),
            SortType::Number | SortType::Custom(_) => {
                compare_numbers(value_number(a.get(field)), value_number(b.get(field)))
            }
        };
        match self.order {
            SortOrder::Asc => raw,
            SortOrder::Desc => raw.reverse(),
        }
    }

    /// Stable-sorted view of `rows`. The input slice is left untouched.
    pub fn sorted<'r>(&self, rows: &'r [Row]) -> Vec<&'r Row> {
        let mut sorted: Vec<&Row> = rows.iter().collect();
        sorted.sort_by(|a, b| self.compare(a, b));
        sorted
    }
}

fn field_text(value: Option<&Value>) -> String {
    value.map(value_text).unwrap_or_default()
}

fn compare_numbers(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_text(a: &str, b: &str, tie_break: TieBreak) -> Ordering {
    match tie_break {
        TieBreak::Legacy => leading_key(a)
            .cmp(&leading_key(b))
            .then_with(|| collate(a, b)),
        TieBreak::Collation => collate(a, b),
    }
}

/// Primary weight and case of the leading character. Comparing it before
/// the rest of the string is what puts `"Bz"` ahead of `"ba"` under the
/// legacy rule. The `ё`/`е` difference is left to collation, so `"ёж"`
/// still sorts before `"ель"`.
fn leading_key(s: &str) -> Option<((u8, char), u8)> {
    s.chars().next().map(|c| (primary(c), tertiary(c)))
}

/// Locale-aware string ordering.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(primary)
        .cmp(b.chars().map(primary))
        .then_with(|| a.chars().map(secondary).cmp(b.chars().map(secondary)))
        .then_with(|| a.chars().map(tertiary).cmp(b.chars().map(tertiary)))
        .then_with(|| a.cmp(b))
}

/// Primary weight: character class, then the case-folded character.
fn primary(c: char) -> (u8, char) {
    let class = if c.is_whitespace() {
        0
    } else if is_cyrillic(c) {
        3
    } else if c.is_alphabetic() {
        4
    } else if c.is_numeric() {
        2
    } else {
        1
    };
    (class, fold(c))
}

fn is_cyrillic(c: char) -> bool {
    ('\u{0400}'..='\u{04FF}').contains(&c)
}

fn fold(c: char) -> char {
    let lower = c.to_lowercase().next().unwrap_or(c);
    if lower == 'ё' { 'е' } else { lower }
}

/// Secondary weight: diacritic difference (`ё` after `е`).
fn secondary(c: char) -> u8 {
    u8::from(matches!(c, 'ё' | 'Ё'))
}

/// Tertiary weight: uppercase first.
fn tertiary(c: char) -> u8 {
    u8::from(!c.is_uppercase())
}

/// Sorted copy of `rows` on a sortable column of `schema`.
pub fn sort_rows(
    rows: &[Row],
    schema: &Schema,
    column_id: &str,
    order: SortOrder,
    tie_break: TieBreak,
) -> Result<Vec<Row>, SchemaError> {
    let comparator = Comparator::new(schema, column_id, order)?.tie_break(tie_break);
    Ok(comparator.sorted(rows).into_iter().cloned().collect())
}

/// Sort strings by their leading character only (uppercase forced ahead of
/// lowercase on a case-only difference); `Desc` is the reverse of `Asc`.
pub fn sort_strings<S: AsRef<str>>(values: &[S], order: SortOrder) -> Vec<String> {
    let mut sorted: Vec<String> = values.iter().map(|s| s.as_ref().to_string()).collect();
    sorted.sort_by(|a, b| {
        let (ca, cb) = (leading(a), leading(b));
        compare_text(&ca, &cb, TieBreak::Legacy)
    });
    if order == SortOrder::Desc {
        sorted.reverse();
    }
    sorted
}

fn leading(s: &str) -> String {
    s.chars().next().map(String::from).unwrap_or_default()
}
