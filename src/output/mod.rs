use anyhow::Result;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::report::AnalysisReport;

pub mod formatters;

pub use formatters::*;

fn render(report: &AnalysisReport, format: &OutputFormat, styled: bool) -> Result<String> {
    let content = match format {
        OutputFormat::Text => format_as_text(report, styled),
        OutputFormat::Json => format_as_json(report)?,
        OutputFormat::Csv => format_as_csv(report),
        OutputFormat::Markdown => format_as_markdown(report, chrono::Utc::now()),
    };

    Ok(content)
}

/// Save analysis report to file
pub async fn save_to_file(report: &AnalysisReport, path: &Path, format: &OutputFormat) -> Result<()> {
    let content = render(report, format, false)?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent)?;
    }

    fs_err::write(path, content)?;
    Ok(())
}

/// Print analysis report to console
pub fn print_to_console(report: &AnalysisReport, format: &OutputFormat) -> Result<()> {
    let styled = matches!(format, OutputFormat::Text) && console::Term::stdout().features().colors_supported();
    let content = render(report, format, styled)?;

    println!("{}", content);
    Ok(())
}
