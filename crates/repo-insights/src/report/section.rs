use super::chart::ChartSpec;
use super::narrative::Block;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Narrative plus at most one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub key: String,
    pub intro: Vec<Block>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commentary: Vec<Block>,
}

impl ReportSection {
    /// First heading of the section, if it has one.
    pub fn title(&self) -> Option<&str> {
        self.intro.iter().find_map(Block::heading_text)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub title: String,
    pub byline: String,
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<ReportSection>,
}

impl Report {
    pub fn section(&self, key: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|section| section.key == key)
    }

    pub fn charts(&self) -> impl Iterator<Item = (&str, &ChartSpec)> {
        self.sections
            .iter()
            .filter_map(|section| section.chart.as_ref().map(|chart| (section.key.as_str(), chart)))
    }
}
