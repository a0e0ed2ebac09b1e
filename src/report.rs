use std::fmt::Write;

use crate::aggregate::{DashboardData, Histogram, HOUR_LABELS};
use crate::api::ApiError;
use crate::models::Provenance;

const BAR_WIDTH: usize = 24;
const DAYS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    "#".repeat(count * BAR_WIDTH / max)
}

fn write_histogram(output: &mut String, title: &str, histogram: &Histogram) {
    let max = histogram.max();
    let _ = writeln!(output);
    let _ = writeln!(output, "## {}", title);
    for (label, count) in histogram.iter() {
        let _ = writeln!(output, "- {:<13} {:>4} {}", label, count, bar(count, max));
    }
}

fn write_heatmap(output: &mut String, heatmap: &Histogram) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## Opportunities by Hour & Day");
    let _ = writeln!(output, "| Day | 8-4 | 12-8 |");
    let _ = writeln!(output, "|-----|-----|------|");
    for day in DAYS {
        let morning = heatmap.get(&format!("{day}-8-4")).unwrap_or(0);
        let rest = heatmap.get(&format!("{day}-12-8")).unwrap_or(0);
        let _ = writeln!(output, "| {} | {} | {} |", day, morning, rest);
    }
}

fn write_hours(output: &mut String, by_hour: &[usize; 9]) {
    let max = by_hour.iter().copied().max().unwrap_or(0);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Opportunities by Hour");
    for (label, count) in HOUR_LABELS.iter().zip(by_hour.iter()) {
        let _ = writeln!(output, "- {:<5} {:>4} {}", label, count, bar(*count, max));
    }
}

pub fn build_report(
    data: &DashboardData,
    provenance: Provenance,
    failure: Option<&ApiError>,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Opportunity Heatmap");
    let _ = writeln!(
        output,
        "Visual breakdown of opportunities by time, source, category, stage, and score."
    );
    let _ = writeln!(output);

    if provenance.is_demo() {
        let _ = writeln!(output, "> Demo Mode • Showing sample data ({})", provenance);
    } else {
        let _ = writeln!(output, "Data source: {}", provenance);
    }
    if let Some(err) = failure {
        let _ = writeln!(output, "> Last fetch failed: {}", err);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(
        output,
        "- Total Opportunities: {}",
        data.summary.total_opportunities
    );
    let _ = writeln!(output, "- Avg Score: {}%", data.summary.average_score);
    let _ = writeln!(output, "- Conversion: {}%", data.summary.conversion_rate);

    write_heatmap(&mut output, &data.heatmap);
    write_hours(&mut output, &data.by_hour);
    write_histogram(&mut output, "Opportunities by Category", &data.by_category);
    write_histogram(&mut output, "Opportunities by Stage", &data.by_stage);
    write_histogram(&mut output, "Opportunities by Source", &data.by_source);
    write_histogram(
        &mut output,
        "Opportunity Score Distribution",
        &data.score_distribution,
    );

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::tests::sample_opportunity;
    use chrono::Utc;

    fn sample_data() -> DashboardData {
        let opportunities = ["qualified", "closed", "new"]
            .into_iter()
            .map(sample_opportunity)
            .collect();
        DashboardData::build_in(opportunities, &Utc)
    }

    #[test]
    fn live_report_has_summary_and_every_chart() {
        let report = build_report(&sample_data(), Provenance::Live, None);

        assert!(report.contains("Data source: live"));
        assert!(!report.contains("Demo Mode"));
        assert!(report.contains("- Total Opportunities: 3"));
        assert!(report.contains("- Avg Score: 48%"));
        assert!(report.contains("- Conversion: 33%"));
        for title in [
            "## Opportunities by Hour & Day",
            "## Opportunities by Hour",
            "## Opportunities by Category",
            "## Opportunities by Stage",
            "## Opportunities by Source",
            "## Opportunity Score Distribution",
        ] {
            assert!(report.contains(title), "missing {title}");
        }
    }

    #[test]
    fn demo_report_shows_banner_and_reason() {
        let failure = ApiError::Status(503);
        let report = build_report(&sample_data(), Provenance::DemoError, Some(&failure));

        assert!(report.contains("Demo Mode • Showing sample data (demo-error)"));
        assert!(report.contains("Last fetch failed: Failed to fetch opportunities: 503"));
    }

    #[test]
    fn heatmap_table_lists_every_day() {
        // sample records are created on a Wednesday at 10:30 UTC
        let report = build_report(&sample_data(), Provenance::Live, None);
        assert!(report.contains("| We | 3 | 0 |"));
        assert!(report.contains("| Su | 0 | 0 |"));
    }

    #[test]
    fn bar_scales_to_largest_bucket() {
        assert_eq!(bar(0, 0), "");
        assert_eq!(bar(4, 4).len(), BAR_WIDTH);
        assert_eq!(bar(2, 4).len(), BAR_WIDTH / 2);
    }
}
