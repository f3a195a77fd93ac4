use chrono::DateTime;

use crate::providers::ItemStats;

/// Render a publish timestamp as `YYYY-MM-DD HH:MM UTC`, or as-is when unparseable
pub fn format_published_at(published_at: &str) -> String {
    DateTime::parse_from_rfc3339(published_at)
        .map(|date| date.naive_utc().format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|_| published_at.to_string())
}

/// Format a percentage with two decimals
pub fn format_percentage(percentage: f64) -> String {
    format!("{:.2}%", percentage)
}

/// Known counters only; unknown ones are left out entirely
pub fn format_stats(stats: &ItemStats) -> Option<String> {
    let parts: Vec<String> = [
        ("views", stats.views),
        ("likes", stats.likes),
        ("dislikes", stats.dislikes),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.map(|value| format!("{} {}", value, label)))
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

/// Shorten text to at most `max_chars` characters, marking the cut with an ellipsis
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}

/// Sanitize filename for safe filesystem usage
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            match c {
                // Keep alphanumeric characters, spaces, hyphens, underscores, and dots
                c if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '.' => c,
                // Replace everything else with underscore
                _ => '_',
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Generate a report filename from the channel title and the current time
pub fn generate_report_filename(channel_title: &str, extension: &str) -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let name = sanitize_filename(channel_title).replace(' ', "_");
    let name = if name.is_empty() { "channel".to_string() } else { name };

    format!("lexicon_{}_{}.{}", name, timestamp, extension)
}

/// Check if the current environment has required tools
pub async fn check_dependencies(yt_dlp_path: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(yt_dlp_path).await {
        missing.push(format!("{} - required for caption retrieval", yt_dlp_path));
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
