use chrono::{DateTime, SecondsFormat, Utc};

/// Current time in the stored timestamp format.
pub fn timestamp_now() -> String {
    format_timestamp(&Utc::now())
}

/// Fixed-width RFC 3339 in UTC (`2024-05-01T18:30:00.000Z`), so stored
/// timestamps sort lexicographically.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a stored timestamp.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
