//! "Posted X ago" strings for job ads

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

/// Parse an ISO-8601 timestamp as sent by HiBob.
///
/// Accepts RFC 3339 (`2024-05-01T10:00:00Z`, `2024-05-01T10:00:00.123+02:00`),
/// a naive date-time taken as UTC, or a bare date at midnight UTC.
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Human relative age of `published` as seen from `now`.
///
/// Picks the largest unit that fits: years, months (30 days), weeks, days,
/// hours, minutes, else "just now". Timestamps in the future count as "just now".
pub fn time_ago(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - published).num_seconds();

    let units = [
        (YEAR, "year"),
        (MONTH, "month"),
        (WEEK, "week"),
        (DAY, "day"),
        (HOUR, "hour"),
        (MINUTE, "minute"),
    ];

    units
        .iter()
        .find(|(size, _)| elapsed >= *size)
        .map(|(size, unit)| {
            let count = elapsed / size;
            let plural = if count > 1 { "s" } else { "" };
            format!("{count} {unit}{plural} ago")
        })
        .unwrap_or_else(|| "just now".to_string())
}

/// [`time_ago`] for a raw date string; empty when the string does not parse.
pub fn posted_ago(raw: &str, now: DateTime<Utc>) -> String {
    parse_published(raw)
        .map(|published| time_ago(published, now))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap()
    }

    fn ago(duration: Duration) -> String {
        time_ago(now() - duration, now())
    }

    #[test]
    fn test_twenty_five_hours_is_one_day() {
        assert_eq!(ago(Duration::hours(25)), "1 day ago");
    }

    #[test]
    fn test_thirty_minutes() {
        assert_eq!(ago(Duration::minutes(30)), "30 minutes ago");
    }

    #[test]
    fn test_singular_units() {
        assert_eq!(ago(Duration::minutes(1)), "1 minute ago");
        assert_eq!(ago(Duration::hours(1)), "1 hour ago");
        assert_eq!(ago(Duration::days(7)), "1 week ago");
        assert_eq!(ago(Duration::days(30)), "1 month ago");
        assert_eq!(ago(Duration::days(365)), "1 year ago");
    }

    #[test]
    fn test_plural_units() {
        assert_eq!(ago(Duration::hours(5)), "5 hours ago");
        assert_eq!(ago(Duration::days(3)), "3 days ago");
        assert_eq!(ago(Duration::days(20)), "2 weeks ago");
        assert_eq!(ago(Duration::days(95)), "3 months ago");
        assert_eq!(ago(Duration::days(800)), "2 years ago");
    }

    #[test]
    fn test_under_a_minute_is_just_now() {
        assert_eq!(ago(Duration::seconds(59)), "just now");
        assert_eq!(ago(Duration::zero()), "just now");
    }

    #[test]
    fn test_future_is_just_now() {
        assert_eq!(ago(Duration::hours(-3)), "just now");
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let parsed = parse_published("2025-03-15T14:00:00+02:00").unwrap();
        assert_eq!(parsed, now());
    }

    #[test]
    fn test_parse_naive_and_date_only() {
        assert_eq!(parse_published("2025-03-15T12:00:00").unwrap(), now());
        assert_eq!(parse_published("2025-03-15 12:00:00.500").unwrap().timestamp(), now().timestamp());
        assert_eq!(
            parse_published("2025-03-15").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_posted_ago_from_string() {
        assert_eq!(posted_ago("2025-03-14T11:00:00Z", now()), "1 day ago");
    }

    #[test]
    fn test_unparseable_date_is_empty() {
        assert_eq!(posted_ago("last tuesday", now()), "");
        assert_eq!(posted_ago("", now()), "");
        assert_eq!(posted_ago("2025-13-45", now()), "");
    }
}
