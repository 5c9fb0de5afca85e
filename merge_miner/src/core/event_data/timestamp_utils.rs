//! Timestamp parsing for event log importers

use chrono::{DateTime, FixedOffset, NaiveDateTime};

/// Naive formats tried after the timezone-aware ones; all are interpreted as UTC.
const NAIVE_FORMATS: [&str; 5] = [
    "%F %T%.f",
    "%FT%T%.f",
    "%FT%T",
    "%F %T UTC",
    "%F %T",
];

/// Parse a timestamp string to `DateTime<FixedOffset>`, trying multiple formats.
///
/// A custom format (if given) is tried first, both timezone-aware and as naive UTC.
/// Afterwards RFC 3339, ISO 8601 with a `+0000` offset, RFC 2822 and a set of naive
/// formats (e.g., `2023-10-06 09:30:21.890421`, `2023-10-06T09:30:21`) are attempted.
///
/// Returns `None` if no format matches.
pub fn parse_timestamp(time: &str, custom_format: Option<&str>) -> Option<DateTime<FixedOffset>> {
    let time = time.trim();
    if let Some(date_format) = custom_format {
        if let Ok(dt) = DateTime::parse_from_str(time, date_format) {
            return Some(dt);
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(time, date_format) {
            return Some(dt.and_utc().into());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(time) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(time, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(time) {
        return Some(dt);
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(time, f).ok())
        .map(|dt| dt.and_utc().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_keeps_offset() {
        let dt = parse_timestamp("2023-10-06T09:30:21+02:00", None).unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn naive_formats_are_utc() {
        for s in [
            "2023-10-06 09:30:21.890421",
            "2023-10-06T09:30:21.348",
            "2023-10-06T09:30:21",
            "2023-10-06 09:30:21",
        ] {
            let dt = parse_timestamp(s, None).unwrap();
            assert_eq!(dt.offset().local_minus_utc(), 0, "{s}");
        }
    }

    #[test]
    fn custom_format_first() {
        assert!(parse_timestamp("06/10/2023 09:30:21", Some("%d/%m/%Y %H:%M:%S")).is_some());
        assert!(parse_timestamp("06/10/2023 09:30:21", None).is_none());
    }
}
