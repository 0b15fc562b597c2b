//! Timestamp parsing and the pre/post split.

use super::columns::column;
use super::PanelError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use polars::prelude::{AnyValue, DataFrame, DataType, TimeUnit};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Days between 0001-01-01 and 1970-01-01 in the proleptic Gregorian calendar.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Parse a date-like string (`YYYY-MM-DD`, optionally followed by a time of
/// day separated by a space or `T`).
///
/// # Example
///
/// ```
/// use causal_tools::panel::parse_timestamp;
///
/// let t = parse_timestamp("2022-08-23 22:00:00").unwrap();
/// assert_eq!(t.to_string(), "2022-08-23 22:00:00");
/// ```
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, PanelError> {
    let trimmed = raw.trim();
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| PanelError::InvalidTimestamp(raw.to_string()))
}

fn from_epoch(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let instant = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::<Utc>::from_timestamp_nanos(value)),
        TimeUnit::Microseconds => DateTime::<Utc>::from_timestamp_micros(value),
        TimeUnit::Milliseconds => DateTime::<Utc>::from_timestamp_millis(value),
    };
    instant.map(|t| t.naive_utc())
}

fn from_epoch_days(days: i32) -> Option<NaiveDateTime> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Read a time column as naive wall-clock timestamps.
///
/// Naive `Datetime` columns keep their native resolution, `Date` columns map
/// to midnight, and `String` columns are parsed with [`parse_timestamp`].
/// Time-zone-aware `Datetime` columns are rejected: their instants are stored
/// in UTC, so the cutoff and quarter boundaries would be compared in the
/// wrong clock. Strip the zone (keeping local time) before estimating.
pub fn time_values(df: &DataFrame, name: &str) -> Result<Vec<NaiveDateTime>, PanelError> {
    let col = column(df, name)?;
    if let DataType::Datetime(_, Some(_)) = col.dtype() {
        return Err(PanelError::UnsupportedTimeType {
            column: name.to_string(),
            dtype: col.dtype().to_string(),
        });
    }

    let mut values = Vec::with_capacity(col.len());

    for row in 0..col.len() {
        let parsed = match col.get(row)? {
            AnyValue::Null => {
                return Err(PanelError::MissingValue {
                    column: name.to_string(),
                    row,
                })
            }
            AnyValue::Datetime(v, unit, _) | AnyValue::DatetimeOwned(v, unit, _) => {
                from_epoch(v, unit)
                    .ok_or_else(|| PanelError::InvalidTimestamp(format!("{v} ({unit:?})")))?
            }
            AnyValue::Date(days) => from_epoch_days(days)
                .ok_or_else(|| PanelError::InvalidTimestamp(format!("{days} days")))?,
            AnyValue::String(s) => parse_timestamp(s)?,
            AnyValue::StringOwned(s) => parse_timestamp(s.as_str())?,
            _ => {
                return Err(PanelError::UnsupportedTimeType {
                    column: name.to_string(),
                    dtype: col.dtype().to_string(),
                })
            }
        };
        values.push(parsed);
    }

    Ok(values)
}

/// 0/1 indicator of timestamps at or after `cutoff`.
pub fn post_indicator(times: &[NaiveDateTime], cutoff: NaiveDateTime) -> Vec<f64> {
    times
        .iter()
        .map(|t| if *t >= cutoff { 1.0 } else { 0.0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use proptest::prelude::*;

    fn ts(raw: &str) -> NaiveDateTime {
        parse_timestamp(raw).unwrap()
    }

    #[test]
    fn test_parse_formats() {
        let expected = NaiveDate::from_ymd_opt(2022, 8, 23)
            .and_then(|d| d.and_hms_opt(22, 0, 0))
            .unwrap();

        assert_eq!(ts("2022-08-23 22:00:00"), expected);
        assert_eq!(ts("2022-08-23T22:00:00"), expected);
        assert_eq!(ts("2022-08-23 22:00"), expected);
        assert_eq!(ts("2022-08-23T22:00"), expected);
        assert_eq!(ts(" 2022-08-23 22:00:00.000 "), expected);
        assert_eq!(ts("2022-08-23"), expected.date().and_time(NaiveTime::MIN));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_timestamp("23/08/2022"),
            Err(PanelError::InvalidTimestamp(_))
        ));
        assert!(parse_timestamp("2022-13-01").is_err());
    }

    #[test]
    fn test_post_indicator_is_inclusive() {
        let times = vec![ts("2022-08-23 21:59:59"), ts("2022-08-23 22:00:00"), ts("2022-09-01")];
        let post = post_indicator(&times, ts("2022-08-23 22:00"));
        assert_eq!(post, vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_string_time_column() {
        let df = df! { "t" => ["2021-01-01", "2021-06-30 12:00"] }.unwrap();
        let values = time_values(&df, "t").unwrap();
        assert_eq!(values[1], ts("2021-06-30 12:00"));
    }

    #[test]
    fn test_datetime_column() {
        let stamps = [ts("2021-03-31 23:59:59"), ts("2021-04-01 00:00:00")];
        let millis: Vec<i64> = stamps
            .iter()
            .map(|t| t.and_utc().timestamp_millis())
            .collect();
        let series = Series::new("t".into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap();
        let df = DataFrame::new(vec![series.into()]).unwrap();

        assert_eq!(time_values(&df, "t").unwrap(), stamps.to_vec());
    }

    #[test]
    fn test_date_column() {
        let series = Series::new("d".into(), [0i32, 19_000])
            .cast(&DataType::Date)
            .unwrap();
        let df = DataFrame::new(vec![series.into()]).unwrap();

        let values = time_values(&df, "d").unwrap();
        assert_eq!(values[0], ts("1970-01-01"));
        assert_eq!(values[1], ts("2022-01-08"));
    }

    #[test]
    fn test_unsupported_time_dtype() {
        let df = df! { "t" => [1.5f64] }.unwrap();
        assert!(matches!(
            time_values(&df, "t"),
            Err(PanelError::UnsupportedTimeType { .. })
        ));
    }

    #[test]
    fn test_zoned_datetime_column_rejected() {
        // 2022-06-30 22:30 UTC is 2022-07-01 00:30 on a Zurich wall clock
        let millis = ts("2022-06-30 22:30:00").and_utc().timestamp_millis();
        let zone = TimeZone::opt_try_new(Some("Europe/Zurich")).unwrap();
        let zoned = Int64Chunked::new("t".into(), &[millis])
            .into_datetime(TimeUnit::Milliseconds, zone)
            .into_series();
        let df = DataFrame::new(vec![zoned.into()]).unwrap();

        match time_values(&df, "t") {
            Err(PanelError::UnsupportedTimeType { column, dtype }) => {
                assert_eq!(column, "t");
                assert!(dtype.contains("Europe/Zurich"), "{dtype}");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn prop_post_iff_not_before_cutoff(offsets in prop::collection::vec(-100_000i64..100_000, 1..50)) {
            let cutoff = ts("2022-08-23 22:00:00");
            let times: Vec<NaiveDateTime> = offsets
                .iter()
                .map(|&s| cutoff + chrono::TimeDelta::seconds(s))
                .collect();

            let post = post_indicator(&times, cutoff);
            for (flag, offset) in post.iter().zip(&offsets) {
                prop_assert_eq!(*flag, if *offset >= 0 { 1.0 } else { 0.0 });
            }
        }
    }
}
