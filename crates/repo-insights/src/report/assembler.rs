use super::blueprint::{ReportBlueprint, SectionTemplate, TableSource};
use super::chart::ChartBuilder;
use super::error::ReportError;
use super::section::{Report, ReportSection};
use super::table::{SummaryTable, TableLoader};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{debug, info};

/// Where section tables come from.
pub trait TableProvider: Send + Sync {
    fn load(&self, source: &TableSource) -> Result<SummaryTable, ReportError>;
}

/// Reads `<root>/<file_name>` for every table.
#[derive(Debug, Clone)]
pub struct DirectoryTables {
    root: PathBuf,
}

impl DirectoryTables {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TableProvider for DirectoryTables {
    fn load(&self, source: &TableSource) -> Result<SummaryTable, ReportError> {
        TableLoader::from_path(self.root.join(source.file_name), &source.schema)
    }
}

pub struct ReportAssembler<P> {
    provider: P,
}

impl<P: TableProvider> ReportAssembler<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Builds every section in blueprint order. The first failure aborts the
    /// whole report.
    pub fn assemble(
        &self,
        blueprint: &ReportBlueprint,
        generated_at: DateTime<Utc>,
    ) -> Result<Report, ReportError> {
        let mut sections = Vec::with_capacity(blueprint.sections().len());
        for template in blueprint.sections() {
            sections.push(self.build_section(template)?);
        }

        info!(
            sections = sections.len(),
            charts = sections.iter().filter(|s| s.chart.is_some()).count(),
            "report assembled"
        );

        Ok(Report {
            title: blueprint.title().to_string(),
            byline: blueprint.byline().to_string(),
            generated_at,
            sections,
        })
    }

    pub fn assemble_section(
        &self,
        blueprint: &ReportBlueprint,
        key: &str,
    ) -> Result<ReportSection, ReportError> {
        let template = blueprint
            .section(key)
            .ok_or_else(|| ReportError::UnknownSection(key.to_string()))?;
        self.build_section(template)
    }

    fn build_section(&self, template: &SectionTemplate) -> Result<ReportSection, ReportError> {
        let chart = match &template.chart {
            Some(chart) => {
                let table = self.provider.load(&chart.source)?;
                let spec = ChartBuilder::build(&table, &chart.config)?;
                debug!(
                    section = template.key,
                    table = table.name(),
                    source_rows = table.len(),
                    chart_rows = spec.row_count(),
                    "section chart built"
                );
                Some(spec)
            }
            None => None,
        };

        Ok(ReportSection {
            key: template.key.to_string(),
            intro: template.intro.clone(),
            chart,
            commentary: template.commentary.clone(),
        })
    }
}
