//! Date parsing and formatting.
//!
//! A [`DateFormat`] wraps a chrono strftime pattern. The default is
//! ISO-8601 with millisecond precision and an explicit numeric UTC offset;
//! provider-specific formats are supplied as custom patterns. Patterns
//! without an offset directive are interpreted as UTC.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// A date/time format specification shared by decode and encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pattern: String,
    has_offset: bool,
}

impl DateFormat {
    /// ISO-8601 with millisecond precision and a numeric UTC offset,
    /// e.g. `2018-05-18T14:53:37.000+00:00`.
    pub fn iso8601_millis() -> Self {
        Self::custom("%Y-%m-%dT%H:%M:%S%.3f%:z")
    }

    /// A custom strftime pattern.
    pub fn custom(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let has_offset =
            pattern.contains("%z") || pattern.contains("%:z") || pattern.contains("%#z");
        Self {
            pattern,
            has_offset,
        }
    }

    /// The underlying strftime pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Parse a date string, normalizing to UTC.
    pub fn parse(&self, text: &str) -> Option<DateTime<Utc>> {
        if self.has_offset {
            DateTime::parse_from_str(text, &self.pattern)
                .ok()
                .map(|date| date.with_timezone(&Utc))
        } else {
            NaiveDateTime::parse_from_str(text, &self.pattern)
                .ok()
                .map(|naive| Utc.from_utc_datetime(&naive))
        }
    }

    /// Format a UTC date with this pattern.
    pub fn format(&self, date: &DateTime<Utc>) -> String {
        date.format(&self.pattern).to_string()
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self::iso8601_millis()
    }
}
