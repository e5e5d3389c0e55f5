use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::calendar::parse_usage_date;
use crate::error::UsageError;

/// Category label used when a stat carries no consumer name
pub const UNKNOWN_CONSUMER: &str = "Unknown";

/// A single daily query-stats row as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawUsageStat {
    pub date: String,
    pub query_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer_data_product_id: Option<String>,
    #[serde(default)]
    pub consumer_data_product_name: Option<String>,
}

/// Accepted shapes of a usage stats document: the backend envelope or a bare list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UsageStatsPayload {
    Envelope {
        output_port_query_stats_responses: Vec<RawUsageStat>,
    },
    List(Vec<RawUsageStat>),
}

impl UsageStatsPayload {
    pub fn into_stats(self) -> Vec<RawUsageStat> {
        match self {
            UsageStatsPayload::Envelope {
                output_port_query_stats_responses,
            } => output_port_query_stats_responses,
            UsageStatsPayload::List(stats) => stats,
        }
    }
}

/// One day of usage attributed to a category, with the date already parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub date: NaiveDate,
    pub count: u64,
    pub category: String,
}

impl TryFrom<&RawUsageStat> for UsageRecord {
    type Error = UsageError;

    fn try_from(stat: &RawUsageStat) -> Result<Self, Self::Error> {
        let date = parse_usage_date(&stat.date)?;
        let category = stat
            .consumer_data_product_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_CONSUMER)
            .to_string();

        Ok(Self {
            date,
            count: stat.query_count,
            category,
        })
    }
}

/// Longest day range accepted for [`TimeRange::LastDays`]
pub const MAX_RANGE_DAYS: u32 = 3660;

/// How far back from now the chart reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeRange {
    #[default]
    LastMonth,
    Last90Days,
    LastYear,
    /// Arbitrary number of days, between one and [`MAX_RANGE_DAYS`]
    LastDays(u32),
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeRange::LastMonth => write!(f, "last-month"),
            TimeRange::Last90Days => write!(f, "last-90-days"),
            TimeRange::LastYear => write!(f, "last-year"),
            TimeRange::LastDays(days) => write!(f, "{}d", days),
        }
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "last-month" | "month" => Ok(TimeRange::LastMonth),
            "last-90-days" => Ok(TimeRange::Last90Days),
            "last-year" | "year" => Ok(TimeRange::LastYear),
            other => other
                .strip_suffix('d')
                .unwrap_or(other)
                .parse::<u32>()
                .ok()
                .filter(|days| *days <= MAX_RANGE_DAYS)
                .map(|days| TimeRange::LastDays(days.max(1)))
                .ok_or_else(|| {
                    format!(
                        "unknown time range '{}', expected last-month, last-90-days, last-year or <N>d",
                        s
                    )
                }),
        }
    }
}

impl TryFrom<String> for TimeRange {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeRange> for String {
    fn from(range: TimeRange) -> Self {
        range.to_string()
    }
}

/// Width of a chart bucket
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    #[default]
    Week,
    Month,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            _ => Err(format!(
                "unknown granularity '{}', expected day, week or month",
                s
            )),
        }
    }
}

/// A chart bucket, identified by the calendar date it starts on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub iso_date: NaiveDate,
    pub display_label: String,
    pub timestamp_millis: i64,
}

/// One (bucket, category) cell of the chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    #[serde(rename = "displayDate")]
    pub display_label: String,
    #[serde(rename = "timestamp")]
    pub timestamp_millis: i64,
    #[serde(rename = "queryCount")]
    pub count: u64,
    #[serde(rename = "consumer")]
    pub category: String,
}

/// Total usage for one category over the whole chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    #[serde(rename = "consumer")]
    pub category: String,
    #[serde(rename = "totalQueries")]
    pub total_count: u64,
}

/// Everything a chart needs, computed in one pass
#[derive(Debug, Clone, Serialize)]
pub struct UsageChart {
    pub time_range: TimeRange,
    pub granularity: Granularity,
    pub range_start: NaiveDate,
    pub buckets: Vec<Bucket>,
    pub points: Vec<ChartPoint>,
    pub totals: Vec<CategoryTotal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range_parse() {
        assert_eq!("last-month".parse(), Ok(TimeRange::LastMonth));
        assert_eq!("last-90-days".parse(), Ok(TimeRange::Last90Days));
        assert_eq!("LAST-YEAR".parse(), Ok(TimeRange::LastYear));
        assert_eq!("14d".parse(), Ok(TimeRange::LastDays(14)));
        assert_eq!("0".parse(), Ok(TimeRange::LastDays(1)));
        assert!("fortnight".parse::<TimeRange>().is_err());
    }

    #[test]
    fn test_time_range_upper_bound() {
        assert_eq!("3660d".parse(), Ok(TimeRange::LastDays(MAX_RANGE_DAYS)));
        assert!("3661d".parse::<TimeRange>().is_err());
        assert!("4294967295d".parse::<TimeRange>().is_err());
        assert!(serde_json::from_str::<TimeRange>("\"99999d\"").is_err());
    }

    #[test]
    fn test_time_range_serde() {
        let json = serde_json::to_string(&TimeRange::Last90Days).unwrap();
        assert_eq!(json, "\"last-90-days\"");
        let back: TimeRange = serde_json::from_str("\"30d\"").unwrap();
        assert_eq!(back, TimeRange::LastDays(30));
    }

    #[test]
    fn test_record_defaults_unknown_category() {
        let stat = RawUsageStat {
            date: "2024-03-01".to_string(),
            query_count: 4,
            consumer_data_product_id: None,
            consumer_data_product_name: None,
        };
        let record = UsageRecord::try_from(&stat).unwrap();
        assert_eq!(record.category, UNKNOWN_CONSUMER);
        assert_eq!(record.count, 4);
    }

    #[test]
    fn test_record_rejects_bad_date() {
        let stat = RawUsageStat {
            date: "03/01/2024".to_string(),
            query_count: 1,
            consumer_data_product_id: None,
            consumer_data_product_name: Some("Alpha".to_string()),
        };
        assert!(matches!(
            UsageRecord::try_from(&stat),
            Err(UsageError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_payload_accepts_envelope_and_list() {
        let envelope = r#"{"output_port_query_stats_responses":[{"date":"2024-03-01","query_count":2,"consumer_data_product_name":"Alpha"}]}"#;
        let list = r#"[{"date":"2024-03-01","query_count":2}]"#;

        let from_envelope: UsageStatsPayload = serde_json::from_str(envelope).unwrap();
        let from_list: UsageStatsPayload = serde_json::from_str(list).unwrap();

        assert_eq!(from_envelope.into_stats().len(), 1);
        assert_eq!(from_list.into_stats()[0].consumer_data_product_name, None);
    }

    #[test]
    fn test_chart_point_wire_names() {
        let point = ChartPoint {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            display_label: "Mar 1".to_string(),
            timestamp_millis: 1_709_251_200_000,
            count: 8,
            category: "Alpha".to_string(),
        };
        let value = serde_json::to_value(&point).unwrap();
        assert_eq!(value["displayDate"], "Mar 1");
        assert_eq!(value["queryCount"], 8);
        assert_eq!(value["consumer"], "Alpha");
        assert_eq!(value["date"], "2024-03-01");
    }
}
