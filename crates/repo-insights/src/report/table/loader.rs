use super::{CellValue, Column, ColumnType, SummaryTable, TableSchema};
use crate::report::error::ReportError;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::debug;

/// Reads CSV summary files into [`SummaryTable`]s.
pub struct TableLoader;

impl TableLoader {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        schema: &TableSchema,
    ) -> Result<SummaryTable, ReportError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ReportError::MissingFile {
                path: path.to_path_buf(),
            },
            _ => ReportError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self::from_reader(name, file, schema)
    }

    pub fn from_reader<R: Read>(
        name: impl Into<String>,
        reader: R,
        schema: &TableSchema,
    ) -> Result<SummaryTable, ReportError> {
        let name = name.into();
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|err| csv_failure(&name, err))?
            .clone();
        if headers.is_empty() {
            return Err(ReportError::malformed(name, "missing header row"));
        }

        let header_names: Vec<String> = headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                let header = header.trim_start_matches('\u{feff}').trim();
                if header.is_empty() {
                    format!("Unnamed: {index}")
                } else {
                    header.to_string()
                }
            })
            .collect();

        for declared in schema.columns() {
            if !header_names.iter().any(|header| *header == declared.name) {
                return Err(ReportError::unknown_field(&name, &declared.name));
            }
        }

        let mut raw_rows: Vec<Vec<String>> = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|err| csv_failure(&name, err))?;
            raw_rows.push(record.iter().map(str::to_string).collect());
        }

        let columns: Vec<Column> = header_names
            .into_iter()
            .enumerate()
            .map(|(index, header)| {
                let kind = schema
                    .declared_type(&header)
                    .unwrap_or_else(|| infer_type(raw_rows.iter().map(|row| row[index].as_str())));
                Column::new(header, kind)
            })
            .collect();

        let mut coerced = vec![0usize; columns.len()];
        let rows: Vec<Vec<CellValue>> = raw_rows
            .iter()
            .map(|raw| {
                raw.iter()
                    .zip(&columns)
                    .enumerate()
                    .map(|(index, (cell, column))| {
                        let value = parse_cell(cell, column.kind);
                        if value.is_missing() && !cell.is_empty() {
                            coerced[index] += 1;
                        }
                        value
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        for (column, count) in columns.iter().zip(&coerced) {
            if *count > 0 {
                debug!(
                    table = %name,
                    column = %column.name,
                    cells = *count,
                    "unparseable {} cells kept as missing",
                    column.kind.label()
                );
            }
        }

        SummaryTable::new(name, columns, rows)
    }
}

fn csv_failure(table: &str, err: csv::Error) -> ReportError {
    let reason = match err.kind() {
        csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => {
            let line = pos
                .as_ref()
                .map(|pos| format!("line {}", pos.line()))
                .unwrap_or_else(|| "a row".to_string());
            format!("{line} has {len} fields, expected {expected_len}")
        }
        _ => err.to_string(),
    };
    ReportError::malformed(table, reason)
}

fn infer_type<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnType {
    let mut all_integer = true;
    let mut all_float = true;

    for cell in cells.filter(|cell| !cell.is_empty()) {
        if cell.parse::<i64>().is_err() {
            all_integer = false;
        }
        if cell.parse::<f64>().is_err() {
            all_float = false;
            break;
        }
    }

    if !all_float {
        ColumnType::Text
    } else if all_integer {
        ColumnType::Integer
    } else {
        ColumnType::Float
    }
}

fn parse_cell(raw: &str, kind: ColumnType) -> CellValue {
    if raw.is_empty() {
        return CellValue::Missing;
    }

    match kind {
        ColumnType::Text | ColumnType::Categorical => CellValue::Text(raw.to_string()),
        ColumnType::Integer => raw
            .parse::<i64>()
            .ok()
            .or_else(|| {
                raw.parse::<f64>()
                    .ok()
                    .filter(|value| {
                        value.fract() == 0.0
                            && *value >= i64::MIN as f64
                            && *value < i64::MAX as f64
                    })
                    .map(|value| value as i64)
            })
            .map(CellValue::Integer)
            .unwrap_or(CellValue::Missing),
        ColumnType::Float => raw
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(CellValue::Float)
            .unwrap_or(CellValue::Missing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn infers_integer_float_and_text_columns() {
        let table = TableLoader::from_reader(
            "inferred.csv",
            Cursor::new("created_year,share,label\n2020,10.5,a\n2021,,b\n"),
            &TableSchema::inferred(),
        )
        .expect("table loads");

        let kinds: Vec<ColumnType> = table.columns().iter().map(|column| column.kind).collect();
        assert_eq!(
            kinds,
            vec![ColumnType::Integer, ColumnType::Float, ColumnType::Text]
        );
        assert_eq!(table.value(1, "share"), Some(&CellValue::Missing));
    }

    #[test]
    fn declared_numeric_columns_keep_garbage_as_missing() {
        let schema = TableSchema::inferred()
            .column("Season", ColumnType::Categorical)
            .column("Average Repositories", ColumnType::Float);
        let table = TableLoader::from_reader(
            "seasons.csv",
            Cursor::new("Season,Average Repositories\nSpring,12.5\nWinter,n/a\n"),
            &schema,
        )
        .expect("table loads");

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.value(0, "Average Repositories"),
            Some(&CellValue::Float(12.5))
        );
        assert_eq!(
            table.value(1, "Average Repositories"),
            Some(&CellValue::Missing)
        );
    }

    #[test]
    fn integer_columns_accept_integral_floats() {
        let schema = TableSchema::inferred().column("created_year", ColumnType::Integer);
        let table = TableLoader::from_reader(
            "years.csv",
            Cursor::new("created_year\n2020.0\n2021.5\n"),
            &schema,
        )
        .expect("table loads");

        assert_eq!(table.value(0, "created_year"), Some(&CellValue::Integer(2020)));
        assert_eq!(table.value(1, "created_year"), Some(&CellValue::Missing));
    }

    #[test]
    fn integer_columns_keep_out_of_range_values_missing() {
        let schema = TableSchema::inferred().column("0", ColumnType::Integer);
        let table = TableLoader::from_reader(
            "counts.csv",
            Cursor::new("0\n9223372036854775808\n1e300\n-9223372036854775808\n"),
            &schema,
        )
        .expect("table loads");

        assert_eq!(table.value(0, "0"), Some(&CellValue::Missing));
        assert_eq!(table.value(1, "0"), Some(&CellValue::Missing));
        assert_eq!(table.value(2, "0"), Some(&CellValue::Integer(i64::MIN)));
    }

    #[test]
    fn remaining_type_applies_to_undeclared_columns() {
        let schema = TableSchema::inferred()
            .column("created_year", ColumnType::Integer)
            .remaining(ColumnType::Float);
        let table = TableLoader::from_reader(
            "wide.csv",
            Cursor::new("created_year,Python,Ruby\n2020,10,2\n"),
            &schema,
        )
        .expect("table loads");

        assert_eq!(table.column("Python").map(|c| c.kind), Some(ColumnType::Float));
        assert_eq!(table.value(0, "Ruby"), Some(&CellValue::Float(2.0)));
    }

    #[test]
    fn strips_bom_and_names_blank_headers() {
        let table = TableLoader::from_reader(
            "bom.csv",
            Cursor::new("\u{feff}name,,overall_popularity\nrepo,0,12\n"),
            &TableSchema::inferred(),
        )
        .expect("table loads");

        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["name", "Unnamed: 1", "overall_popularity"]);
    }

    #[test]
    fn inconsistent_column_counts_are_malformed() {
        let error = TableLoader::from_reader(
            "ragged.csv",
            Cursor::new("name,overall_popularity\nA,100\nB,500,extra\n"),
            &TableSchema::inferred(),
        )
        .expect_err("ragged csv rejected");

        match error {
            ReportError::MalformedTable { table, reason } => {
                assert_eq!(table, "ragged.csv");
                assert!(reason.contains("expected 2"), "reason was {reason}");
            }
            other => panic!("expected malformed table, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_malformed() {
        let error = TableLoader::from_reader("empty.csv", Cursor::new(""), &TableSchema::inferred())
            .expect_err("empty csv rejected");
        assert!(matches!(error, ReportError::MalformedTable { .. }));
    }

    #[test]
    fn duplicate_headers_are_malformed() {
        let error = TableLoader::from_reader(
            "dupes.csv",
            Cursor::new("Month,Month\n1,2\n"),
            &TableSchema::inferred(),
        )
        .expect_err("duplicate headers rejected");
        assert!(matches!(error, ReportError::MalformedTable { .. }));
    }

    #[test]
    fn missing_declared_column_is_unknown_field() {
        let schema = TableSchema::inferred().column("overall_popularity", ColumnType::Float);
        let error = TableLoader::from_reader(
            "names.csv",
            Cursor::new("name,popularity\nA,1\n"),
            &schema,
        )
        .expect_err("schema mismatch rejected");

        match error {
            ReportError::UnknownField { table, field } => {
                assert_eq!(table, "names.csv");
                assert_eq!(field, "overall_popularity");
            }
            other => panic!("expected unknown field, got {other:?}"),
        }
    }

    #[test]
    fn from_path_reports_missing_file() {
        let error = TableLoader::from_path("./does-not-exist.csv", &TableSchema::inferred())
            .expect_err("expected missing file");

        match error {
            ReportError::MissingFile { path } => {
                assert!(path.ends_with("does-not-exist.csv"));
            }
            other => panic!("expected missing file, got {other:?}"),
        }
    }
}
