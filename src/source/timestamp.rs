use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("invalid timestamp format '{0}'")]
    InvalidFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampFormat {
    Strptime(String),
    Iso8601,
    Epoch,
    EpochMs,
}

/// Parses timestamp fields into epoch milliseconds.
#[derive(Debug, Clone)]
pub struct TimestampParser {
    format: TimestampFormat,
}

impl TimestampParser {
    /// Create a new TimestampParser
    ///
    /// # Arguments
    /// * `format` - One of: strptime format string, 'iso8601', 'epoch', 'epoch_ms'
    pub fn new(format: &str) -> Result<Self, TimestampError> {
        let format = match format {
            "iso8601" => TimestampFormat::Iso8601,
            "epoch" => TimestampFormat::Epoch,
            "epoch_ms" => TimestampFormat::EpochMs,
            other => {
                if other.is_empty() || StrftimeItems::new(other).any(|item| item == Item::Error) {
                    return Err(TimestampError::InvalidFormat(other.to_string()));
                }
                TimestampFormat::Strptime(numeric_zone(other))
            }
        };

        Ok(Self { format })
    }

    pub fn format(&self) -> &TimestampFormat {
        &self.format
    }

    /// Parse a field value into epoch milliseconds.
    ///
    /// Returns None when the value does not match the format.
    pub fn parse(&self, value: &str) -> Option<i64> {
        let datetime = match &self.format {
            TimestampFormat::Iso8601 => parse_iso8601(value)?,
            TimestampFormat::Epoch => {
                let seconds: i64 = value.parse().ok()?;
                return seconds.checked_mul(1000);
            }
            TimestampFormat::EpochMs => return value.parse().ok(),
            TimestampFormat::Strptime(fmt) => parse_strptime(value, fmt)?,
        };

        Some(datetime.timestamp_millis())
    }
}

/// Rewrite `%Z` as `%z`. chrono's `%Z` consumes a zone name without an
/// offset, while log formats use it for `+0000` style offsets.
fn numeric_zone(format: &str) -> String {
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        out.push(c);
        if c == '%' {
            match chars.next() {
                Some('Z') => out.push('z'),
                Some(next) => out.push(next),
                None => {}
            }
        }
    }

    out
}

fn parse_iso8601(value: &str) -> Option<DateTime<Utc>> {
    // RFC3339 handles ISO8601 with timezone
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn parse_strptime(value: &str, format: &str) -> Option<DateTime<Utc>> {
    if format.contains("%z") || format.contains("%:z") {
        return DateTime::parse_from_str(value, format)
            .map(|dt| dt.with_timezone(&Utc))
            .ok();
    }

    // No zone in the format: assume UTC
    if let Ok(ndt) = NaiveDateTime::parse_from_str(value, format) {
        return Some(Utc.from_utc_datetime(&ndt));
    }

    // Date-only formats land on midnight
    NaiveDate::parse_from_str(value, format)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}
