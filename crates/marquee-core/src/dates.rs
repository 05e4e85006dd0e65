use chrono::DateTime;

/// Long-form date for an article's `publishedAt`, e.g. "October 19, 2026".
///
/// Anything that isn't an RFC 3339 timestamp renders as "Invalid date".
pub fn format_published(published_at: Option<&str>) -> String {
    published_at
        .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
        .map(|date| date.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| "Invalid date".to_string())
}
