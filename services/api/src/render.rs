use crate::infra::build_report;
use clap::{Args, ValueEnum};
use repo_insights::config::AppConfig;
use repo_insights::error::AppError;
use repo_insights::report::render::{render_html, render_json, render_outline, HtmlOptions};
use repo_insights::telemetry;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Html,
    Json,
}

#[derive(Args, Debug)]
pub(crate) struct RenderArgs {
    /// Directory holding the summary tables (defaults to REPORT_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Destination file (defaults to REPORT_OUTPUT, with a .json extension for JSON)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Output document format
    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug)]
pub(crate) struct OutlineArgs {
    /// Directory holding the summary tables (defaults to REPORT_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

pub(crate) fn run_render(args: RenderArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let RenderArgs {
        data_dir,
        output,
        format,
    } = args;

    let data_dir = data_dir.unwrap_or(config.report.data_dir);
    let output = output.unwrap_or_else(|| match format {
        OutputFormat::Html => config.report.output_path.clone(),
        OutputFormat::Json => config.report.output_path.with_extension("json"),
    });

    write_report(&data_dir, &output, format)?;
    println!("Report written to {}", output.display());
    Ok(())
}

pub(crate) fn run_outline(args: OutlineArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let data_dir = args.data_dir.unwrap_or(config.report.data_dir);

    let report = build_report(&data_dir)?;
    print!("{}", render_outline(&report));
    Ok(())
}

fn write_report(data_dir: &Path, output: &Path, format: OutputFormat) -> Result<(), AppError> {
    let report = build_report(data_dir)?;
    let document = match format {
        // The page may land anywhere, so images point at the absolute data directory.
        OutputFormat::Html => {
            let asset_base = fs::canonicalize(data_dir)?;
            render_html(
                &report,
                &HtmlOptions::with_asset_base(asset_base.display().to_string()),
            )
        }
        OutputFormat::Json => serde_json::to_string_pretty(&render_json(&report)?)?,
    };

    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, document)?;

    info!(
        output = %output.display(),
        ?format,
        sections = report.sections.len(),
        "report rendered"
    );
    Ok(())
}
