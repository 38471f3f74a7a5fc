use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse a timestamp as served by the task-list API.
///
/// Accepts RFC 3339 ("2025-01-10T14:30:00Z", offset forms) and bare ISO
/// datetimes without an offset, which are taken as UTC. The store emits
/// the latter for documents written before timezone handling was added.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(_) => s.parse::<NaiveDateTime>().map(|ndt| ndt.and_utc()),
    }
}

/// Whole days between two instants, fractional time truncated.
pub fn whole_days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_days()
}

/// Midday UTC on the given date; a stable reporting instant for `--as-of`.
pub fn noon_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(12, 0, 0).unwrap().and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_rfc3339_z() {
        let dt = parse_timestamp("2025-01-10T14:30:00Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-01-10T14:30:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_rfc3339_offset() {
        let dt = parse_timestamp("2025-01-10T14:30:00-03:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-01-10T17:30:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_naive() {
        let dt = parse_timestamp("2025-01-10T14:30:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-01-10T14:30:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_naive_fractional() {
        let dt = parse_timestamp("2025-01-10T14:30:00.123456").unwrap();
        assert_eq!(dt.date_naive(), NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        assert!(parse_timestamp("not a date").is_err());
        assert!(parse_timestamp("2025-01-10").is_err());
    }

    #[test]
    fn test_whole_days_between_truncates() {
        let start = parse_timestamp("2025-01-01T00:00:00Z").unwrap();
        let end = parse_timestamp("2025-01-02T12:00:00Z").unwrap();
        // 36 hours is one whole day
        assert_eq!(whole_days_between(start, end), 1);
    }

    #[test]
    fn test_whole_days_between_same_day() {
        let start = parse_timestamp("2025-01-01T08:00:00Z").unwrap();
        let end = parse_timestamp("2025-01-01T20:00:00Z").unwrap();
        assert_eq!(whole_days_between(start, end), 0);
    }

    #[test]
    fn test_noon_utc() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let dt = noon_utc(date);
        assert_eq!(dt.date_naive(), date);
        assert_eq!(dt.to_rfc3339(), "2025-01-10T12:00:00+00:00");
    }
}
