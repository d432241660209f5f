use crate::aggregate::classifier::Bucket;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Parse a range bound given as epoch milliseconds, RFC3339, or a local
/// `YYYY-MM-DDTHH:MM[:SS]` value interpreted as UTC.
pub fn parse_bound(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(millis) = raw.parse::<i64>() {
        return Some(millis);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).timestamp_millis());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|ndt| Utc.from_utc_datetime(&ndt).timestamp_millis())
}

/// Keep buckets with `x >= from`. No bound keeps everything.
pub fn filter_from(buckets: &[Bucket], from: Option<i64>) -> Vec<Bucket> {
    match from {
        Some(from) => buckets.iter().copied().filter(|b| b.x >= from).collect(),
        None => buckets.to_vec(),
    }
}

/// Keep buckets with `x <= until`. No bound keeps everything.
pub fn filter_until(buckets: &[Bucket], until: Option<i64>) -> Vec<Bucket> {
    match until {
        Some(until) => buckets.iter().copied().filter(|b| b.x <= until).collect(),
        None => buckets.to_vec(),
    }
}

/// Apply both bounds, keeping emission order.
pub fn filter_range(buckets: &[Bucket], from: Option<i64>, until: Option<i64>) -> Vec<Bucket> {
    filter_until(&filter_from(buckets, from), until)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buckets() -> Vec<Bucket> {
        vec![
            Bucket { x: 30, y: 1 },
            Bucket { x: 10, y: 2 },
            Bucket { x: 20, y: 3 },
        ]
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert_eq!(
            filter_from(&buckets(), Some(20)),
            vec![Bucket { x: 30, y: 1 }, Bucket { x: 20, y: 3 }]
        );
        assert_eq!(
            filter_until(&buckets(), Some(20)),
            vec![Bucket { x: 10, y: 2 }, Bucket { x: 20, y: 3 }]
        );
        assert_eq!(filter_range(&buckets(), Some(15), Some(25)), vec![Bucket { x: 20, y: 3 }]);
    }

    #[test]
    fn test_missing_bound_keeps_everything() {
        assert_eq!(filter_range(&buckets(), None, None), buckets());
    }

    #[test]
    fn test_parse_bound() {
        assert_eq!(parse_bound("1577836800000"), Some(1_577_836_800_000));
        assert_eq!(parse_bound("2020-01-01T01:00:00+01:00"), Some(1_577_836_800_000));
        assert_eq!(parse_bound("2020-01-01T00:00"), Some(1_577_836_800_000));
        assert_eq!(parse_bound("2020-01-01T00:00:30"), Some(1_577_836_830_000));
        assert_eq!(parse_bound("yesterday"), None);
    }
}
