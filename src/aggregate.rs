use chrono::{Datelike, Local, TimeZone, Timelike};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::models::{Opportunity, Summary};
use crate::score;

pub const HEATMAP_KEYS: [&str; 14] = [
    "Su-12-8", "Su-8-4", "Mo-12-8", "Mo-8-4", "Tu-12-8", "Tu-8-4", "We-12-8", "We-8-4",
    "Th-12-8", "Th-8-4", "Fr-12-8", "Fr-8-4", "Sa-12-8", "Sa-8-4",
];
pub const CATEGORY_BUCKETS: [&str; 5] = ["Service", "Parts", "Accessories", "Consulting", "Other"];
pub const STAGE_BUCKETS: [&str; 5] = ["New", "Contact", "Qualified", "Proposal", "Closed"];
pub const SOURCE_BUCKETS: [&str; 6] =
    ["Walk-In", "Web", "Referral", "Social Media", "Email", "Other"];
pub const SCORE_BUCKETS: [&str; 4] = ["0-25", "26-50", "51-75", "76-100"];
pub const HOUR_LABELS: [&str; 9] = [
    "8AM", "9AM", "10AM", "11AM", "12PM", "1PM", "2PM", "3PM", "4PM",
];

const FIRST_HOUR: u32 = 8;
const LAST_HOUR: u32 = 16;

/// Fixed-shape count table. Buckets are declared up front and never grow, so
/// every label is present in the output even when its count is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    buckets: Vec<(&'static str, usize)>,
}

impl Histogram {
    pub fn with_buckets(labels: &[&'static str]) -> Self {
        Self {
            buckets: labels.iter().map(|label| (*label, 0)).collect(),
        }
    }

    fn increment(&mut self, index: usize) {
        self.buckets[index].1 += 1;
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.buckets
            .iter()
            .find(|(bucket, _)| *bucket == label)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.buckets.iter().copied()
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(|(_, count)| count).sum()
    }

    pub fn max(&self) -> usize {
        self.buckets.iter().map(|(_, count)| *count).max().unwrap_or(0)
    }
}

impl Serialize for Histogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (label, count) in &self.buckets {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

/// Opportunity list bundled with every chart it feeds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub opportunities: Vec<Opportunity>,
    pub summary: Summary,
    pub by_category: Histogram,
    pub by_stage: Histogram,
    pub by_source: Histogram,
    pub score_distribution: Histogram,
    pub by_hour: [usize; 9],
    pub heatmap: Histogram,
}

impl DashboardData {
    pub fn build(opportunities: Vec<Opportunity>) -> Self {
        Self::build_in(opportunities, &Local)
    }

    pub fn build_in<Tz: TimeZone>(opportunities: Vec<Opportunity>, tz: &Tz) -> Self {
        Self {
            summary: score::summarize(&opportunities),
            by_category: category_histogram(&opportunities),
            by_stage: stage_histogram(&opportunities),
            by_source: source_histogram(&opportunities),
            score_distribution: score_histogram(&opportunities),
            by_hour: hourly_histogram_in(&opportunities, tz),
            heatmap: heatmap_in(&opportunities, tz),
            opportunities,
        }
    }
}

/// Day-of-week by time-slot counts. The "8-4" slot covers 08:00 to 11:59;
/// everything else lands in "12-8".
pub fn heatmap_in<Tz: TimeZone>(opportunities: &[Opportunity], tz: &Tz) -> Histogram {
    let mut histogram = Histogram::with_buckets(&HEATMAP_KEYS);

    for opportunity in opportunities {
        let local = opportunity.created_at.with_timezone(tz);
        let day = local.weekday().num_days_from_sunday() as usize;
        let hour = local.hour();
        let slot = if (8..12).contains(&hour) { 1 } else { 0 };
        histogram.increment(day * 2 + slot);
    }

    histogram
}

/// Counts per hour from 8AM to 4PM inclusive. Records outside that window are
/// left out of this chart only.
pub fn hourly_histogram_in<Tz: TimeZone>(opportunities: &[Opportunity], tz: &Tz) -> [usize; 9] {
    let mut counts = [0usize; 9];

    for opportunity in opportunities {
        let hour = opportunity.created_at.with_timezone(tz).hour();
        if (FIRST_HOUR..=LAST_HOUR).contains(&hour) {
            counts[(hour - FIRST_HOUR) as usize] += 1;
        }
    }

    counts
}

fn category_index(opportunity: &Opportunity) -> usize {
    match opportunity.kind.as_str() {
        "individual" => {
            let subject = opportunity.subject.as_str();
            if subject.contains("Service") {
                0
            } else if subject.contains("Parts") {
                1
            } else if subject.contains("Accessories") {
                2
            } else {
                0
            }
        }
        "organization" => 3,
        _ => 4,
    }
}

pub fn category_histogram(opportunities: &[Opportunity]) -> Histogram {
    let mut histogram = Histogram::with_buckets(&CATEGORY_BUCKETS);
    for opportunity in opportunities {
        histogram.increment(category_index(opportunity));
    }
    histogram
}

fn stage_index(status: &str) -> usize {
    match status.to_lowercase().as_str() {
        "contacted" => 1,
        "qualified" => 2,
        "proposal" => 3,
        "closed" => 4,
        _ => 0,
    }
}

pub fn stage_histogram(opportunities: &[Opportunity]) -> Histogram {
    let mut histogram = Histogram::with_buckets(&STAGE_BUCKETS);
    for opportunity in opportunities {
        histogram.increment(stage_index(&opportunity.status));
    }
    histogram
}

fn source_index(source: &str) -> usize {
    match source.to_lowercase().as_str() {
        "walk_in" => 0,
        "website" => 1,
        "manual" => 2,
        "social_media" => 3,
        "email" => 4,
        // "test", "referral" and anything unknown
        _ => 5,
    }
}

pub fn source_histogram(opportunities: &[Opportunity]) -> Histogram {
    let mut histogram = Histogram::with_buckets(&SOURCE_BUCKETS);
    for opportunity in opportunities {
        histogram.increment(source_index(&opportunity.source));
    }
    histogram
}

fn score_bucket_index(score: u32) -> usize {
    match score {
        0..=25 => 0,
        26..=50 => 1,
        51..=75 => 2,
        _ => 3,
    }
}

pub fn score_histogram(opportunities: &[Opportunity]) -> Histogram {
    let mut histogram = Histogram::with_buckets(&SCORE_BUCKETS);
    for opportunity in opportunities {
        histogram.increment(score_bucket_index(score::score(opportunity)));
    }
    histogram
}
