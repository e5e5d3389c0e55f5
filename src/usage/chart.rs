use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};

use super::calendar::{align_to_granularity, build_buckets, compute_range_start};
use super::types::*;
use crate::error::UsageError;

/// Turn raw daily stats into a gap-filled chart, relative to the current time.
pub fn transform_to_chart_points(
    stats: &[RawUsageStat],
    range: TimeRange,
    granularity: Granularity,
) -> Result<Vec<ChartPoint>, UsageError> {
    transform_to_chart_points_at(stats, range, granularity, Utc::now())
}

/// Same as [`transform_to_chart_points`] with an explicit `now`.
///
/// Fails without output if any stat carries an unparseable date.
pub fn transform_to_chart_points_at(
    stats: &[RawUsageStat],
    range: TimeRange,
    granularity: Granularity,
    now: DateTime<Utc>,
) -> Result<Vec<ChartPoint>, UsageError> {
    let records = parse_records(stats)?;
    Ok(chart_points_from_records(&records, range, granularity, now))
}

/// Build buckets, points and totals in one call.
pub fn build_usage_chart(
    stats: &[RawUsageStat],
    range: TimeRange,
    granularity: Granularity,
    now: DateTime<Utc>,
) -> Result<UsageChart, UsageError> {
    let records = parse_records(stats)?;
    let range_start = compute_range_start(now, range);
    let buckets = build_buckets(range_start, now.date_naive(), granularity);
    let points = fill_points(&records, &buckets, granularity);
    let totals = aggregate_totals_by_category(&points);

    Ok(UsageChart {
        time_range: range,
        granularity,
        range_start,
        buckets,
        points,
        totals,
    })
}

/// Gap-filled points for already parsed records.
pub fn chart_points_from_records(
    records: &[UsageRecord],
    range: TimeRange,
    granularity: Granularity,
    now: DateTime<Utc>,
) -> Vec<ChartPoint> {
    let range_start = compute_range_start(now, range);
    let buckets = build_buckets(range_start, now.date_naive(), granularity);
    fill_points(records, &buckets, granularity)
}

/// Sum counts per category, largest total first.
///
/// Ties keep the order in which categories first appear in `points`.
pub fn aggregate_totals_by_category(points: &[ChartPoint]) -> Vec<CategoryTotal> {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, u64> = HashMap::new();

    for point in points {
        let entry = totals.entry(point.category.as_str()).or_insert_with(|| {
            order.push(point.category.as_str());
            0
        });
        *entry = entry.saturating_add(point.count);
    }

    let mut result: Vec<CategoryTotal> = order
        .into_iter()
        .map(|category| CategoryTotal {
            category: category.to_string(),
            total_count: totals.get(category).copied().unwrap_or(0),
        })
        .collect();
    result.sort_by(|a, b| b.total_count.cmp(&a.total_count));
    result
}

fn parse_records(stats: &[RawUsageStat]) -> Result<Vec<UsageRecord>, UsageError> {
    stats.iter().map(UsageRecord::try_from).collect()
}

/// Cross every category with every bucket, sorted by bucket time.
///
/// Counts are keyed on the bucket start each record aligns to, not on the
/// record's exact date, so a mid-week record still lands in its week bucket.
///
/// Categories are ordered by their earliest record; that order survives the
/// stable sort, so points sharing a bucket stay in first-seen category order.
fn fill_points(records: &[UsageRecord], buckets: &[Bucket], granularity: Granularity) -> Vec<ChartPoint> {
    let mut chronological: Vec<&UsageRecord> = records.iter().collect();
    chronological.sort_by_key(|record| record.date);

    let mut categories: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut counts: HashMap<(NaiveDate, &str), u64> = HashMap::new();

    for record in chronological {
        let category = record.category.as_str();
        if seen.insert(category) {
            categories.push(category);
        }
        let key = (align_to_granularity(record.date, granularity), category);
        let entry = counts.entry(key).or_insert(0);
        *entry = entry.saturating_add(record.count);
    }

    let mut points = Vec::with_capacity(categories.len() * buckets.len());
    for category in &categories {
        for bucket in buckets {
            points.push(ChartPoint {
                date: bucket.iso_date,
                display_label: bucket.display_label.clone(),
                timestamp_millis: bucket.timestamp_millis,
                count: counts.get(&(bucket.iso_date, *category)).copied().unwrap_or(0),
                category: category.to_string(),
            });
        }
    }

    points.sort_by_key(|point| point.timestamp_millis);
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stat(date: &str, count: u64, consumer: Option<&str>) -> RawUsageStat {
        RawUsageStat {
            date: date.to_string(),
            query_count: count,
            consumer_data_product_id: None,
            consumer_data_product_name: consumer.map(str::to_string),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<RawUsageStat> {
        vec![
            stat("2024-03-01", 5, Some("Alpha")),
            stat("2024-03-01", 3, Some("Alpha")),
            stat("2024-03-02", 2, Some("Beta")),
        ]
    }

    fn find<'a>(points: &'a [ChartPoint], date: NaiveDate, category: &str) -> &'a ChartPoint {
        points
            .iter()
            .find(|p| p.date == date && p.category == category)
            .unwrap()
    }

    #[test]
    fn test_end_to_end_daily() {
        let points =
            transform_to_chart_points_at(&sample(), TimeRange::LastMonth, Granularity::Day, now())
                .unwrap();

        assert_eq!(find(&points, day(2024, 3, 1), "Alpha").count, 8);
        assert_eq!(find(&points, day(2024, 3, 2), "Beta").count, 2);
        assert_eq!(find(&points, day(2024, 3, 1), "Beta").count, 0);
    }

    #[test]
    fn test_cross_product_size_matches_buckets() {
        let range_start = compute_range_start(now(), TimeRange::LastMonth);
        let buckets = build_buckets(range_start, now().date_naive(), Granularity::Day);
        let points =
            transform_to_chart_points_at(&sample(), TimeRange::LastMonth, Granularity::Day, now())
                .unwrap();

        // Feb 15 through Mar 15 inclusive
        assert_eq!(buckets.len(), 30);
        assert_eq!(points.len(), 2 * buckets.len());

        let bucket_dates: HashSet<NaiveDate> = buckets.iter().map(|b| b.iso_date).collect();
        let point_dates: HashSet<NaiveDate> = points.iter().map(|p| p.date).collect();
        assert_eq!(bucket_dates, point_dates);
    }

    #[test]
    fn test_empty_input_yields_no_points() {
        let points =
            transform_to_chart_points_at(&[], TimeRange::LastYear, Granularity::Month, now())
                .unwrap();
        assert!(points.is_empty());
        assert!(aggregate_totals_by_category(&points).is_empty());
    }

    #[test]
    fn test_sorted_by_timestamp_with_first_seen_tiebreak() {
        let stats = vec![
            stat("2024-03-10", 1, Some("Later")),
            stat("2024-03-02", 1, Some("Earlier")),
        ];
        let points =
            transform_to_chart_points_at(&stats, TimeRange::LastMonth, Granularity::Day, now())
                .unwrap();

        assert!(points
            .windows(2)
            .all(|w| w[0].timestamp_millis <= w[1].timestamp_millis));
        assert_eq!(points[0].category, "Earlier");
        assert_eq!(points[1].category, "Later");
    }

    #[test]
    fn test_out_of_range_records_are_dropped() {
        let stats = vec![
            stat("2023-01-01", 100, Some("Alpha")),
            stat("2024-03-14", 1, Some("Alpha")),
        ];
        let points =
            transform_to_chart_points_at(&stats, TimeRange::LastMonth, Granularity::Day, now())
                .unwrap();
        let totals = aggregate_totals_by_category(&points);
        assert_eq!(totals[0].total_count, 1);
    }

    #[test]
    fn test_weekly_buckets_sum_whole_week() {
        let stats = vec![
            stat("2024-03-11", 1, Some("Alpha")),
            stat("2024-03-13", 2, Some("Alpha")),
            stat("2024-03-17", 4, Some("Alpha")),
        ];
        let points =
            transform_to_chart_points_at(&stats, TimeRange::LastMonth, Granularity::Week, now())
                .unwrap();
        assert_eq!(find(&points, day(2024, 3, 11), "Alpha").count, 7);
    }

    #[test]
    fn test_malformed_date_fails_whole_call() {
        let stats = vec![stat("2024-03-01", 1, Some("Alpha")), stat("yesterday", 1, None)];
        let err =
            transform_to_chart_points_at(&stats, TimeRange::LastMonth, Granularity::Day, now())
                .unwrap_err();
        assert!(matches!(err, UsageError::MalformedInput { ref date, .. } if date == "yesterday"));
    }

    #[test]
    fn test_null_consumer_becomes_unknown() {
        let stats = vec![stat("2024-03-01", 3, None)];
        let points =
            transform_to_chart_points_at(&stats, TimeRange::LastMonth, Granularity::Day, now())
                .unwrap();
        assert!(points.iter().all(|p| p.category == UNKNOWN_CONSUMER));
    }

    #[test]
    fn test_totals_consistent_and_descending() {
        let chart =
            build_usage_chart(&sample(), TimeRange::LastMonth, Granularity::Day, now()).unwrap();

        assert_eq!(chart.totals.len(), 2);
        assert_eq!(chart.totals[0].category, "Alpha");
        assert_eq!(chart.totals[0].total_count, 8);
        assert_eq!(chart.totals[1].total_count, 2);

        for total in &chart.totals {
            let summed: u64 = chart
                .points
                .iter()
                .filter(|p| p.category == total.category)
                .map(|p| p.count)
                .sum();
            assert_eq!(summed, total.total_count);
        }
    }

    #[test]
    fn test_totals_tie_keeps_first_seen_order() {
        let points = vec![
            ChartPoint {
                date: day(2024, 3, 1),
                display_label: "Mar 1".to_string(),
                timestamp_millis: 0,
                count: 2,
                category: "Zeta".to_string(),
            },
            ChartPoint {
                date: day(2024, 3, 1),
                display_label: "Mar 1".to_string(),
                timestamp_millis: 0,
                count: 2,
                category: "Alpha".to_string(),
            },
        ];
        let totals = aggregate_totals_by_category(&points);
        assert_eq!(totals[0].category, "Zeta");
        assert_eq!(totals[1].category, "Alpha");
    }

    #[test]
    fn test_idempotent() {
        let first =
            transform_to_chart_points_at(&sample(), TimeRange::Last90Days, Granularity::Week, now())
                .unwrap();
        let second =
            transform_to_chart_points_at(&sample(), TimeRange::Last90Days, Granularity::Week, now())
                .unwrap();
        assert_eq!(first, second);
    }
}
