use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use repo_insights::report::{
    DirectoryTables, Report, ReportAssembler, ReportBlueprint, ReportError, ReportSection,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Route prefix for static images referenced by report sections.
pub(crate) const ASSET_ROUTE: &str = "/assets";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) data_dir: Arc<PathBuf>,
}

fn assembler(data_dir: &Path) -> ReportAssembler<DirectoryTables> {
    ReportAssembler::new(DirectoryTables::new(data_dir))
}

/// Reloads every table under `data_dir` and assembles the full report.
pub(crate) fn build_report(data_dir: &Path) -> Result<Report, ReportError> {
    assembler(data_dir).assemble(&ReportBlueprint::standard(), Utc::now())
}

pub(crate) fn build_section(data_dir: &Path, key: &str) -> Result<ReportSection, ReportError> {
    assembler(data_dir).assemble_section(&ReportBlueprint::standard(), key)
}

#[cfg(test)]
pub(crate) fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../crates/repo-insights/tests/fixtures")
}
