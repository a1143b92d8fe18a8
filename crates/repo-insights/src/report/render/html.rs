//! Self-contained HTML rendering. Charts are Vega-Lite documents embedded
//! through vega-embed.

use crate::report::narrative::{Block, Bullet};
use crate::report::section::{Report, ReportSection};
use crate::report::ChartSpec;
use std::fmt::Write as _;

const VEGA_SCRIPTS: [&str; 3] = [
    "https://cdn.jsdelivr.net/npm/vega@5",
    "https://cdn.jsdelivr.net/npm/vega-lite@5",
    "https://cdn.jsdelivr.net/npm/vega-embed@6",
];

/// Where image blocks are served from, prefixed to their file names.
#[derive(Debug, Clone, Default)]
pub struct HtmlOptions {
    pub asset_base: String,
}

impl HtmlOptions {
    pub fn with_asset_base(asset_base: impl Into<String>) -> Self {
        Self {
            asset_base: asset_base.into(),
        }
    }

    fn asset_url(&self, source: &str) -> String {
        if self.asset_base.is_empty() {
            source.to_string()
        } else {
            format!("{}/{}", self.asset_base.trim_end_matches('/'), source)
        }
    }
}

pub fn render_html(report: &Report, options: &HtmlOptions) -> String {
    let scripts: String = VEGA_SCRIPTS
        .iter()
        .map(|src| format!("<script src=\"{src}\"></script>\n"))
        .collect();

    let mut body = String::new();
    for section in &report.sections {
        render_section(&mut body, section, options);
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{css}</style>
{scripts}</head>
<body>
<main class="report">
<header>
<h1>{title}</h1>
<p class="byline">{byline}</p>
</header>
{body}<footer>Generated {generated}</footer>
</main>
</body>
</html>
"#,
        title = escape_html(&report.title),
        byline = escape_html(&report.byline),
        css = STYLESHEET,
        scripts = scripts,
        body = body,
        generated = report.generated_at.format("%Y-%m-%d %H:%M UTC"),
    )
}

fn render_section(html: &mut String, section: &ReportSection, options: &HtmlOptions) {
    writeln!(html, "<section id=\"{}\">", escape_html(&section.key)).expect("section open");
    for block in &section.intro {
        render_block(html, block, options);
    }
    if let Some(chart) = &section.chart {
        render_chart(html, &section.key, chart);
    }
    for block in &section.commentary {
        render_block(html, block, options);
    }
    html.push_str("</section>\n");
}

fn render_chart(html: &mut String, key: &str, chart: &ChartSpec) {
    let element_id = format!("chart-{}", slug(key));
    let spec = escape_script(&chart.to_vega_lite().to_string());
    writeln!(html, "<div class=\"chart\" id=\"{element_id}\"></div>").expect("chart container");
    writeln!(
        html,
        "<script>vegaEmbed(\"#{element_id}\", {spec}, {{\"actions\": false}});</script>"
    )
    .expect("chart script");
}

fn render_block(html: &mut String, block: &Block, options: &HtmlOptions) {
    match block {
        Block::Heading { level, text, link } => {
            let level = (*level).clamp(1, 6);
            let text = escape_html(text);
            let written = match link {
                Some(url) => writeln!(
                    html,
                    "<h{level}><a href=\"{}\">{text}</a></h{level}>",
                    escape_html(url)
                ),
                None => writeln!(html, "<h{level}>{text}</h{level}>"),
            };
            written.expect("heading");
        }
        Block::Paragraph { text } => {
            writeln!(html, "<p>{}</p>", escape_html(text)).expect("paragraph");
        }
        Block::Bullets { items } => render_bullets(html, items),
        Block::KeyFinding { text } => {
            writeln!(
                html,
                "<p class=\"finding\"><strong>Key Finding</strong>: {}</p>",
                escape_html(text)
            )
            .expect("finding");
        }
        Block::Footnote { text } => {
            writeln!(html, "<p class=\"footnote\">{}</p>", escape_html(text)).expect("footnote");
        }
        Block::Image { source, alt } => {
            writeln!(
                html,
                "<figure><img src=\"{}\" alt=\"{}\"></figure>",
                escape_html(&options.asset_url(source)),
                escape_html(alt)
            )
            .expect("image");
        }
    }
}

// Items carry their own depth; lists are opened and closed as it changes.
fn render_bullets(html: &mut String, items: &[Bullet]) {
    let mut open = 0usize;
    for item in items {
        let depth = usize::from(item.depth) + 1;
        while open < depth {
            html.push_str("<ul>\n");
            open += 1;
        }
        while open > depth {
            html.push_str("</ul>\n");
            open -= 1;
        }

        html.push_str("<li>");
        html.push_str(&escape_html(&item.text));
        if let Some(link) = &item.link {
            if !item.text.is_empty() {
                html.push(' ');
            }
            write!(
                html,
                "<a href=\"{}\">{}</a>",
                escape_html(&link.url),
                escape_html(&link.label)
            )
            .expect("bullet link");
        }
        html.push_str("</li>\n");
    }
    while open > 0 {
        html.push_str("</ul>\n");
        open -= 1;
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

// JSON inside <script> must not close the element early.
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn slug(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

const STYLESHEET: &str = r#"
body { font-family: system-ui, -apple-system, 'Segoe UI', sans-serif; line-height: 1.6; color: #1f2933; margin: 0; }
.report { max-width: 960px; margin: 0 auto; padding: 2rem; }
header { border-bottom: 2px solid #e5e7eb; margin-bottom: 2rem; }
.byline { color: #6b7280; font-size: 1.1rem; }
section { margin-bottom: 2.5rem; }
.chart { margin: 1.5rem 0; }
.finding { font-size: 15px; }
.footnote { font-size: 12px; color: #4b5563; }
figure { margin: 1.5rem 0; }
figure img { max-width: 100%; }
footer { color: #9ca3af; font-size: 0.8rem; border-top: 1px solid #e5e7eb; padding-top: 1rem; }
"#;
