use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use portal_core::approvals::PortalClient;
use portal_core::config::load_config;
use portal_core::usage::{build_usage_chart, Granularity, RawUsageStat, TimeRange, UsageChart, UsageStatsPayload};

#[derive(Args)]
pub struct UsageArgs {
    /// Read query stats from a JSON file instead of the backend
    #[arg(long, conflicts_with_all = ["data_product", "output_port"])]
    pub file: Option<PathBuf>,

    /// Data product owning the output port
    #[arg(long, requires = "output_port")]
    pub data_product: Option<String>,

    #[arg(long, requires = "data_product")]
    pub output_port: Option<String>,

    /// last-month, last-90-days, last-year or <N>d (defaults to usage.time_range)
    #[arg(long)]
    pub range: Option<TimeRange>,

    /// Bucket width (defaults to usage.granularity)
    #[arg(long, value_enum)]
    pub granularity: Option<Granularity>,

    /// Reference time as RFC 3339, defaults to now
    #[arg(long)]
    pub now: Option<DateTime<Utc>>,

    /// Print the chart as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the usage command: load stats, bucket them, print the chart
pub async fn run(args: UsageArgs) -> Result<()> {
    let config = load_config()?;
    let range = args.range.unwrap_or(config.usage.time_range);
    let granularity = args.granularity.unwrap_or(config.usage.granularity);

    let stats = match (&args.file, &args.data_product, &args.output_port) {
        (Some(path), _, _) => read_stats(path)?,
        (None, Some(data_product), Some(output_port)) => {
            eprintln!("[portal] Fetching query stats for output port {}", output_port);
            let client = PortalClient::new(&config.api)?;
            client
                .fetch_usage_stats(data_product, output_port, range, granularity)
                .await
                .inspect_err(|e| tracing::warn!(error = %e, "failed to fetch query stats"))?
        }
        _ => bail!("either --file or both --data-product and --output-port are required"),
    };

    let chart = build_usage_chart(&stats, range, granularity, args.now.unwrap_or_else(Utc::now))?;
    tracing::debug!(
        stats = stats.len(),
        buckets = chart.buckets.len(),
        points = chart.points.len(),
        "built usage chart"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&chart)?);
    } else {
        print_chart(&chart);
    }
    Ok(())
}

fn read_stats(path: &Path) -> Result<Vec<RawUsageStat>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let payload: UsageStatsPayload = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse query stats in {}", path.display()))?;
    Ok(payload.into_stats())
}

fn print_chart(chart: &UsageChart) {
    println!(
        "\n{}",
        format!("  Query Usage ({}, per {})", chart.time_range, chart.granularity)
            .bold()
            .bright_yellow()
    );
    println!("{}", "  ─────────────────────────────".dimmed());

    if chart.totals.is_empty() {
        println!("\n  {}", "No queries in this period.".dimmed());
        return;
    }

    let bucket_totals: Vec<u64> = chart
        .buckets
        .iter()
        .map(|bucket| {
            chart
                .points
                .iter()
                .filter(|p| p.date == bucket.iso_date)
                .map(|p| p.count)
                .sum()
        })
        .collect();
    let max_count = bucket_totals.iter().copied().max().unwrap_or(0).max(1);

    println!("\n  {}", "Timeline:".bold());
    for (bucket, total) in chart.buckets.iter().zip(&bucket_totals) {
        let bar: String = "\u{2588}".repeat(bar_len(*total, max_count));
        println!(
            "  {} {} {}",
            format!("{:>8}", bucket.display_label).dimmed(),
            bar.bright_yellow(),
            total.to_string().dimmed()
        );
    }

    println!("\n  {}", "Consumers:".bold());
    for total in &chart.totals {
        println!(
            "    {} {}",
            format!("{:>24}", total.category).cyan(),
            total.total_count.to_string().dimmed()
        );
    }
    println!();
}

/// Bar width out of 30 for `total` relative to the largest bucket
fn bar_len(total: u64, max_count: u64) -> usize {
    (u128::from(total) * 30 / u128::from(max_count.max(1))) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_len_scales_to_max() {
        assert_eq!(bar_len(0, 10), 0);
        assert_eq!(bar_len(5, 10), 15);
        assert_eq!(bar_len(10, 10), 30);
    }

    #[test]
    fn test_bar_len_huge_totals() {
        assert_eq!(bar_len(u64::MAX, u64::MAX), 30);
        assert_eq!(bar_len(u64::MAX / 2, u64::MAX), 14);
    }
}
