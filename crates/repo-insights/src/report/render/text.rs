use crate::report::chart::ChartSpec;
use crate::report::section::Report;
use std::fmt::Write as _;

/// Plain-text table of contents: one line per section, with chart shape.
pub fn render_outline(report: &Report) -> String {
    let mut out = String::new();
    writeln!(out, "{}", report.title).expect("outline title");
    writeln!(out, "{}", report.byline).expect("outline byline");
    out.push('\n');

    for (index, section) in report.sections.iter().enumerate() {
        let title = section.title().unwrap_or(section.key.as_str());
        write!(out, "{:>2}. {title} [{}]", index + 1, section.key).expect("outline section");
        if let Some(chart) = &section.chart {
            write!(out, " - {}", describe_chart(chart)).expect("outline chart");
        }
        out.push('\n');
    }
    out
}

fn describe_chart(chart: &ChartSpec) -> String {
    let mut summary = format!(
        "{}, {} rows, x={}, y={}",
        chart.mark.label(),
        chart.row_count(),
        chart.x.field,
        chart.y.field
    );
    if let Some(color) = &chart.color {
        summary.push_str(&format!(", color={}", color.field));
    }
    summary
}
