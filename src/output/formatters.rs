use anyhow::Result;
use chrono::{DateTime, Utc};
use console::style;
use std::fmt::Write;

use crate::analysis::FrequencyTable;
use crate::report::{AnalysisReport, ItemReport};
use crate::utils::{format_percentage, format_published_at, format_stats, truncate_chars};

const DESCRIPTION_PREVIEW_CHARS: usize = 280;
const NO_CORPUS_MESSAGE: &str = "No captions could be retrieved for this channel's videos.";
const NO_TRANSCRIPT_MESSAGE: &str = "No transcript available.";
const NO_WORDS_MESSAGE: &str = "No words left after stopword filtering.";

/// Why a table has no rows, when there is nothing to render
fn empty_message(transcript_present: bool, table: &FrequencyTable) -> Option<&'static str> {
    if !transcript_present {
        Some(NO_TRANSCRIPT_MESSAGE)
    } else if table.is_empty() {
        Some(NO_WORDS_MESSAGE)
    } else {
        None
    }
}

fn heading(text: &str, styled: bool) -> String {
    if styled {
        style(text).bold().cyan().to_string()
    } else {
        text.to_string()
    }
}

fn count_or_unknown(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "unknown".to_string())
}

/// Ranked rows with aligned columns
fn render_table(out: &mut String, table: &FrequencyTable, indent: &str) {
    let width = table
        .iter()
        .map(|entry| entry.word.chars().count())
        .max()
        .unwrap_or(0);
    let rank_width = table.len().to_string().len();

    for (rank, entry) in table.iter().enumerate() {
        let padding = width - entry.word.chars().count();
        let _ = writeln!(
            out,
            "{}{:>rank_width$}. {}{} {:>6} {:>8}",
            indent,
            rank + 1,
            entry.word,
            " ".repeat(padding),
            entry.count,
            format_percentage(entry.percentage),
            rank_width = rank_width,
        );
    }
}

fn item_heading(item: &ItemReport) -> String {
    format!("{} ({})", item.item.title, format_published_at(&item.item.published_at))
}

/// Plain-text report for the console
pub fn format_as_text(report: &AnalysisReport, styled: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}",
        heading(&format!("Channel: {} ({})", report.display_title(), report.entity_id), styled)
    );
    if let Some(entity) = &report.entity {
        if !entity.description.trim().is_empty() {
            let _ = writeln!(out, "Description: {}", truncate_chars(&entity.description, DESCRIPTION_PREVIEW_CHARS));
        }
        let _ = writeln!(out, "Subscribers: {}", count_or_unknown(entity.subscriber_count));
        let _ = writeln!(out, "Videos: {}", count_or_unknown(entity.item_count));
    }
    let _ = writeln!(
        out,
        "Analyzed {} video(s), {} with transcripts",
        report.items.len(),
        report.transcripts_found()
    );
    out.push('\n');

    let _ = writeln!(out, "{}", heading("Most used words in the channel", styled));
    if report.has_corpus() {
        let _ = writeln!(out, "  ({} words counted)", report.aggregate.total_tokens);
        render_table(&mut out, &report.aggregate, "  ");
    } else if report.transcripts_found() > 0 {
        let _ = writeln!(out, "  {}", NO_WORDS_MESSAGE);
    } else {
        let _ = writeln!(out, "  {}", NO_CORPUS_MESSAGE);
    }

    if !report.items.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "{}", heading("Most used words per video", styled));
    }

    for item in &report.items {
        out.push('\n');
        let _ = writeln!(out, "{}", heading(&item_heading(item), styled));
        if let Some(stats) = format_stats(&item.stats) {
            let _ = writeln!(out, "  {}", stats);
        }
        match empty_message(item.transcript_present, &item.table) {
            Some(message) => {
                let _ = writeln!(out, "  {}", message);
            }
            None => render_table(&mut out, &item.table, "  "),
        }
    }

    out
}

/// JSON document of the full report
pub fn format_as_json(report: &AnalysisReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// One row per table entry; channel-wide rows have empty video columns
pub fn format_as_csv(report: &AnalysisReport) -> String {
    let mut out = String::from("scope,video_id,title,published_at,rank,word,count,percentage\n");

    let mut push_rows = |scope: &str, item: Option<&ItemReport>, table: &FrequencyTable| {
        let (id, title, published_at) = item
            .map(|item| (item.item.id.as_str(), item.item.title.as_str(), item.item.published_at.as_str()))
            .unwrap_or(("", "", ""));

        for (rank, entry) in table.iter().enumerate() {
            let _ = writeln!(
                out,
                "{},{},{},{},{},{},{},{:.4}",
                scope,
                csv_field(id),
                csv_field(title),
                csv_field(published_at),
                rank + 1,
                csv_field(&entry.word),
                entry.count,
                entry.percentage
            );
        }
    };

    push_rows("channel", None, &report.aggregate);
    for item in &report.items {
        push_rows("video", Some(item), &item.table);
    }

    out
}

fn markdown_table(out: &mut String, table: &FrequencyTable) {
    out.push_str("| # | Word | Count | Share |\n|---:|---|---:|---:|\n");
    for (rank, entry) in table.iter().enumerate() {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            rank + 1,
            entry.word,
            entry.count,
            format_percentage(entry.percentage)
        );
    }
}

/// Markdown document with a title and generation time, suitable for printing
pub fn format_as_markdown(report: &AnalysisReport, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Word frequency report: {}\n", report.display_title());
    let _ = writeln!(out, "_Generated {}_\n", generated_at.format("%Y-%m-%d %H:%M UTC"));

    out.push_str("## Channel\n\n");
    let _ = writeln!(out, "- **ID:** {}", report.entity_id);
    if let Some(entity) = &report.entity {
        let _ = writeln!(out, "- **Subscribers:** {}", count_or_unknown(entity.subscriber_count));
        let _ = writeln!(out, "- **Videos:** {}", count_or_unknown(entity.item_count));
        if !entity.description.trim().is_empty() {
            let _ = writeln!(out, "\n> {}", entity.description.trim().replace('\n', "\n> "));
        }
    }
    out.push('\n');

    out.push_str("## Most used words in the channel\n\n");
    if report.has_corpus() {
        let _ = writeln!(out, "{} words counted.\n", report.aggregate.total_tokens);
        markdown_table(&mut out, &report.aggregate);
    } else if report.transcripts_found() > 0 {
        let _ = writeln!(out, "{}", NO_WORDS_MESSAGE);
    } else {
        let _ = writeln!(out, "{}", NO_CORPUS_MESSAGE);
    }

    if !report.items.is_empty() {
        out.push_str("\n## Most used words per video\n");
    }

    for item in &report.items {
        let _ = writeln!(out, "\n### {}\n", item_heading(item));
        if let Some(stats) = format_stats(&item.stats) {
            let _ = writeln!(out, "{}\n", stats);
        }
        match empty_message(item.transcript_present, &item.table) {
            Some(message) => {
                let _ = writeln!(out, "{}", message);
            }
            None => markdown_table(&mut out, &item.table),
        }
    }

    out
}
