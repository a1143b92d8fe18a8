use crate::report::error::ReportError;
use crate::report::table::{CellValue, Column, ColumnType, SummaryTable};

/// Wide-to-long reshape settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeltConfig {
    pub id_column: String,
    pub var_name: String,
    pub value_name: String,
}

impl MeltConfig {
    pub fn new(
        id_column: impl Into<String>,
        var_name: impl Into<String>,
        value_name: impl Into<String>,
    ) -> Self {
        Self {
            id_column: id_column.into(),
            var_name: var_name.into(),
            value_name: value_name.into(),
        }
    }
}

/// Turns every non-id column into `(id, column name, cell)` rows.
///
/// Output is grouped by source column (in column order), then by source row,
/// so each `(id, column)` pair appears exactly once.
pub fn melt(table: &SummaryTable, config: &MeltConfig) -> Result<SummaryTable, ReportError> {
    let id_index = table.require_column(&config.id_column)?;

    let names = [&config.id_column, &config.var_name, &config.value_name];
    for (position, name) in names.iter().enumerate() {
        if names[position + 1..].contains(name) {
            return Err(ReportError::malformed(
                table.name(),
                format!("melt output column `{name}` is used twice"),
            ));
        }
    }

    let value_columns: Vec<(usize, &Column)> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != id_index)
        .collect();

    let value_kind = unify_kinds(value_columns.iter().map(|(_, column)| column.kind));
    let columns = vec![
        table.columns()[id_index].clone(),
        Column::new(config.var_name.as_str(), ColumnType::Categorical),
        Column::new(config.value_name.as_str(), value_kind),
    ];

    let mut rows = Vec::with_capacity(table.len() * value_columns.len());
    for (index, column) in &value_columns {
        for row in table.rows() {
            rows.push(vec![
                row[id_index].clone(),
                CellValue::Text(column.name.clone()),
                coerce(&row[*index], value_kind),
            ]);
        }
    }

    SummaryTable::new(table.name(), columns, rows)
}

fn unify_kinds(kinds: impl Iterator<Item = ColumnType>) -> ColumnType {
    let mut unified: Option<ColumnType> = None;
    for kind in kinds {
        unified = Some(match (unified, kind) {
            (None, kind) => kind,
            (Some(current), kind) if current == kind => current,
            (Some(current), kind) if current.is_numeric() && kind.is_numeric() => {
                ColumnType::Float
            }
            _ => ColumnType::Text,
        });
    }
    unified.unwrap_or(ColumnType::Float)
}

// Integer cells widen to Float when the value column unifies to Float.
fn coerce(cell: &CellValue, kind: ColumnType) -> CellValue {
    match (cell, kind) {
        (CellValue::Integer(value), ColumnType::Float) => CellValue::Float(*value as f64),
        (cell, _) => cell.clone(),
    }
}
