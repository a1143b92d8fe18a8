use std::path::PathBuf;

/// Failures that abort report generation.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("summary table not found at {}", .path.display())]
    MissingFile { path: PathBuf },
    #[error("malformed summary table `{table}`: {reason}")]
    MalformedTable { table: String, reason: String },
    #[error("summary table `{table}` has no column named `{field}`")]
    UnknownField { table: String, field: String },
    #[error("report has no section named `{0}`")]
    UnknownSection(String),
    #[error("failed to read summary table {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    pub(crate) fn malformed(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTable {
            table: table.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_field(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            table: table.into(),
            field: field.into(),
        }
    }
}
