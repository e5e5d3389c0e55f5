use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use super::types::{Bucket, Granularity, TimeRange, MAX_RANGE_DAYS};
use crate::error::UsageError;

/// First calendar day covered by `range`, counted back from `now`.
pub fn compute_range_start(now: DateTime<Utc>, range: TimeRange) -> NaiveDate {
    let today = now.date_naive();
    let start = match range {
        TimeRange::LastMonth => today.checked_sub_months(Months::new(1)),
        TimeRange::Last90Days => today.checked_sub_days(Days::new(90)),
        TimeRange::LastYear => today.checked_sub_months(Months::new(12)),
        TimeRange::LastDays(days) => {
            today.checked_sub_days(Days::new(u64::from(days.clamp(1, MAX_RANGE_DAYS))))
        }
    };
    start.unwrap_or(NaiveDate::MIN)
}

/// Snap a date to the start of its bucket: itself, its Monday, or the 1st of its month.
pub fn align_to_granularity(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => date,
        Granularity::Week => {
            let offset = date.weekday().num_days_from_monday();
            date.checked_sub_days(Days::new(u64::from(offset)))
                .unwrap_or(NaiveDate::MIN)
        }
        Granularity::Month => date.with_day(1).unwrap_or(date),
    }
}

/// Advance by exactly one bucket.
///
/// Months land on the 1st. A day-of-month that does not exist in the next
/// month overflows into the month after it before being snapped, so
/// Jan 31 steps to Mar 1. Aligned dates (day 1) always step to the next month.
pub fn increment_date(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => date.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX),
        Granularity::Week => date.checked_add_days(Days::new(7)).unwrap_or(NaiveDate::MAX),
        Granularity::Month => {
            let (year, month) = next_month(date.year(), date.month());
            let (year, month) = if date.day() > days_in_month(year, month) {
                next_month(year, month)
            } else {
                (year, month)
            };
            NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
        }
    }
}

/// Every bucket from the aligned `range_start` through the aligned `now`, inclusive.
pub fn build_buckets(range_start: NaiveDate, now: NaiveDate, granularity: Granularity) -> Vec<Bucket> {
    let start = align_to_granularity(range_start, granularity);
    let end = align_to_granularity(now, granularity);

    let mut buckets = Vec::new();
    let mut previous_month: Option<(i32, u32)> = None;
    let mut current = start;

    while current <= end {
        let month = (current.year(), current.month());
        let display_label = match granularity {
            Granularity::Day if previous_month == Some(month) => current.format("%-d").to_string(),
            Granularity::Day | Granularity::Week => current.format("%b %-d").to_string(),
            Granularity::Month => current.format("%b").to_string(),
        };

        buckets.push(Bucket {
            iso_date: current,
            display_label,
            timestamp_millis: timestamp_millis(current),
        });
        previous_month = Some(month);

        let next = increment_date(current, granularity);
        if next <= current {
            break;
        }
        current = next;
    }

    buckets
}

/// Milliseconds since the Unix epoch at UTC midnight of `date`
pub fn timestamp_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Parse a usage date into its UTC calendar day.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and offset-less ISO timestamps
/// (read as UTC). Anything else is malformed.
pub fn parse_usage_date(raw: &str) -> Result<NaiveDate, UsageError> {
    let trimmed = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.date())
        .map_err(|e| UsageError::MalformedInput {
            date: raw.to_string(),
            reason: e.to_string(),
        })
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = next_month(year, month);
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(first), Some(next_first)) => (next_first - first).num_days() as u32,
        _ => 31,
    }
}
