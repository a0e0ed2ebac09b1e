use std::io;
use std::path::Path;

use serde::Serialize;

use crate::aggregate::{DashboardData, Histogram, HOUR_LABELS};

#[derive(Debug, Serialize)]
struct ChartRow<'a> {
    chart: &'a str,
    bucket: &'a str,
    count: usize,
}

fn histogram_rows<'a>(
    chart: &'a str,
    histogram: &'a Histogram,
) -> impl Iterator<Item = ChartRow<'a>> {
    histogram
        .iter()
        .map(move |(bucket, count)| ChartRow { chart, bucket, count })
}

/// Writes one `chart,bucket,count` row per bucket of every chart.
pub fn write_chart_rows<W: io::Write>(writer: W, data: &DashboardData) -> anyhow::Result<usize> {
    let mut out = csv::Writer::from_writer(writer);
    let hours = HOUR_LABELS
        .iter()
        .zip(data.by_hour.iter())
        .map(|(bucket, count)| ChartRow {
            chart: "hour",
            bucket: *bucket,
            count: *count,
        });

    let rows = histogram_rows("heatmap", &data.heatmap)
        .chain(hours)
        .chain(histogram_rows("category", &data.by_category))
        .chain(histogram_rows("stage", &data.by_stage))
        .chain(histogram_rows("source", &data.by_source))
        .chain(histogram_rows("score", &data.score_distribution));

    let mut written = 0usize;
    for row in rows {
        out.serialize(row)?;
        written += 1;
    }
    out.flush()?;

    Ok(written)
}

pub fn export_csv(path: &Path, data: &DashboardData) -> anyhow::Result<usize> {
    let file = std::fs::File::create(path)?;
    write_chart_rows(file, data)
}
