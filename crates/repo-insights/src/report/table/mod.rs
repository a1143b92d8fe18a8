mod loader;
mod schema;

use super::error::ReportError;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

pub use loader::TableLoader;
pub use schema::{ColumnSpec, TableSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Integer,
    Float,
    Categorical,
}

impl ColumnType {
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Categorical => "categorical",
        }
    }
}

/// A single typed cell. Empty or unparseable numeric input is `Missing`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Text(_) | Self::Missing => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Compares a cell against a literal taken from configuration, numerically
    /// when the cell is numeric.
    pub fn matches_literal(&self, literal: &str) -> bool {
        let literal = literal.trim();
        match self {
            Self::Integer(value) => literal
                .parse::<i64>()
                .map(|parsed| parsed == *value)
                .or_else(|_| literal.parse::<f64>().map(|parsed| parsed == *value as f64))
                .unwrap_or(false),
            Self::Float(value) => literal
                .parse::<f64>()
                .map(|parsed| parsed == *value)
                .unwrap_or(false),
            Self::Text(value) => value == literal,
            Self::Missing => false,
        }
    }

    /// Ordering used by chart sorting. Numbers compare numerically and sort
    /// ahead of text; `Missing` is handled by the caller.
    pub(crate) fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Missing, Self::Missing) => Ordering::Equal,
            (Self::Missing, _) => Ordering::Greater,
            (_, Self::Missing) => Ordering::Less,
            (Self::Text(_), _) => Ordering::Greater,
            (_, Self::Text(_)) => Ordering::Less,
            (a, b) => {
                let a = a.as_f64().unwrap_or(f64::NAN);
                let b = b.as_f64().unwrap_or(f64::NAN);
                a.total_cmp(&b)
            }
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(value) => write!(f, "{value}"),
            CellValue::Float(value) => write!(f, "{value}"),
            CellValue::Text(value) => f.write_str(value),
            CellValue::Missing => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// An immutable, already-aggregated table backing one report section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Vec<CellValue>>,
}

impl SummaryTable {
    /// Builds a table, rejecting duplicate column names and ragged rows.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<Column>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self, ReportError> {
        let name = name.into();

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ReportError::malformed(
                    name,
                    format!("duplicate column `{}`", column.name),
                ));
            }
        }

        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(ReportError::malformed(
                name,
                format!(
                    "row {} has {} cells, expected {}",
                    index + 1,
                    row.len(),
                    columns.len()
                ),
            ));
        }

        Ok(Self {
            name,
            columns,
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    /// Like [`Self::column_index`] but fails with `UnknownField`.
    pub fn require_column(&self, name: &str) -> Result<usize, ReportError> {
        self.column_index(name)
            .ok_or_else(|| ReportError::unknown_field(&self.name, name))
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|cells| &cells[index])
    }

    /// All values of one column in row order.
    pub fn column_values(&self, column: &str) -> Option<Vec<&CellValue>> {
        let index = self.column_index(column)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_ragged_rows() {
        let error = SummaryTable::new(
            "ragged",
            vec![
                Column::new("name", ColumnType::Text),
                Column::new("count", ColumnType::Integer),
            ],
            vec![vec![CellValue::Text("a".into())]],
        )
        .expect_err("ragged rows rejected");

        match error {
            ReportError::MalformedTable { table, reason } => {
                assert_eq!(table, "ragged");
                assert!(reason.contains("row 1"));
            }
            other => panic!("expected malformed table, got {other:?}"),
        }
    }

    #[test]
    fn new_rejects_duplicate_columns() {
        let error = SummaryTable::new(
            "dupes",
            vec![
                Column::new("name", ColumnType::Text),
                Column::new("name", ColumnType::Text),
            ],
            Vec::new(),
        )
        .expect_err("duplicate columns rejected");
        assert!(matches!(error, ReportError::MalformedTable { .. }));
    }

    #[test]
    fn require_column_reports_unknown_field() {
        let table = SummaryTable::new(
            "seasons",
            vec![Column::new("Season", ColumnType::Categorical)],
            Vec::new(),
        )
        .expect("table builds");

        match table.require_column("Month") {
            Err(ReportError::UnknownField { table, field }) => {
                assert_eq!(table, "seasons");
                assert_eq!(field, "Month");
            }
            other => panic!("expected unknown field, got {other:?}"),
        }
    }

    #[test]
    fn literal_matching_is_numeric_for_numbers() {
        assert!(CellValue::Integer(2023).matches_literal("2023"));
        assert!(CellValue::Integer(2023).matches_literal("2023.0"));
        assert!(CellValue::Float(1.5).matches_literal(" 1.5 "));
        assert!(CellValue::Text("Spring".into()).matches_literal("Spring"));
        assert!(!CellValue::Missing.matches_literal(""));
    }

    #[test]
    fn compare_puts_numbers_before_text_and_missing_last() {
        assert_eq!(
            CellValue::Integer(3).compare(&CellValue::Float(2.5)),
            Ordering::Greater
        );
        assert_eq!(
            CellValue::Float(1.0).compare(&CellValue::Text("a".into())),
            Ordering::Less
        );
        assert_eq!(
            CellValue::Missing.compare(&CellValue::Integer(0)),
            Ordering::Greater
        );
    }

    #[test]
    fn missing_cells_serialize_as_null() {
        let json = serde_json::to_string(&vec![
            CellValue::Integer(1),
            CellValue::Missing,
            CellValue::Text("x".into()),
        ])
        .expect("serialize");
        assert_eq!(json, r#"[1,null,"x"]"#);
    }
}
