pub mod calendar;
pub mod chart;
pub mod types;

pub use calendar::{
    align_to_granularity, build_buckets, compute_range_start, increment_date, parse_usage_date,
};
pub use chart::{
    aggregate_totals_by_category, build_usage_chart, chart_points_from_records,
    transform_to_chart_points, transform_to_chart_points_at,
};
pub use types::*;
