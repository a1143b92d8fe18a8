use super::ColumnType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnType,
}

/// Expected columns of a summary table.
///
/// Declared columns must be present in the file. `remaining` types every
/// other column (the wide language table has one column per language), and
/// when it is unset undeclared columns are inferred from their cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSchema {
    columns: Vec<ColumnSpec>,
    remaining: Option<ColumnType>,
}

impl TableSchema {
    pub fn inferred() -> Self {
        Self::default()
    }

    pub fn column(mut self, name: impl Into<String>, kind: ColumnType) -> Self {
        self.columns.push(ColumnSpec {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn remaining(mut self, kind: ColumnType) -> Self {
        self.remaining = Some(kind);
        self
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn declared_type(&self, name: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .map(|column| column.kind)
            .or(self.remaining)
    }
}
