//! Output formats for an assembled [`Report`](crate::report::Report).

mod html;
mod text;

pub use html::{render_html, HtmlOptions};
pub use text::render_outline;

use crate::report::section::{Report, ReportSection};
use serde_json::{json, Value};

/// One section as JSON; charted sections also carry their Vega-Lite document.
pub fn render_section_json(section: &ReportSection) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(section)?;
    if let (Some(chart), Some(object)) = (&section.chart, value.as_object_mut()) {
        object.insert("vega_lite".into(), chart.to_vega_lite());
    }
    Ok(value)
}

pub fn render_json(report: &Report) -> Result<Value, serde_json::Error> {
    let sections = report
        .sections
        .iter()
        .map(render_section_json)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(json!({
        "title": report.title,
        "byline": report.byline,
        "generated_at": serde_json::to_value(report.generated_at)?,
        "sections": sections,
    }))
}
