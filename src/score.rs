use crate::models::{Opportunity, Summary};

const BASE_SCORE: i32 = 25;

/// Heuristic lead score in `0..=100`.
///
/// Every bonus applies independently, so a closed opportunity with a quote
/// and a vehicle collects all three.
pub fn score(opportunity: &Opportunity) -> u32 {
    let mut score = BASE_SCORE;

    if opportunity.status == "qualified" {
        score += 40;
    }
    if opportunity.status == "closed" {
        score += 30;
    }
    if !opportunity.vehicles.is_empty() {
        score += 15;
    }
    if !opportunity.quotes.is_empty() {
        score += 20;
    }
    if !opportunity.job_cards.is_empty() {
        score += 10;
    }
    if opportunity.is_assigned() {
        score += 5;
    }

    score.clamp(0, 100) as u32
}

/// Mean score rounded to the nearest integer; zero for an empty list.
pub fn average_score(opportunities: &[Opportunity]) -> u32 {
    if opportunities.is_empty() {
        return 0;
    }

    let total: u32 = opportunities.iter().map(score).sum();
    (total as f64 / opportunities.len() as f64).round() as u32
}

/// Percentage of opportunities with status `closed`, rounded.
pub fn conversion_rate(opportunities: &[Opportunity]) -> u32 {
    if opportunities.is_empty() {
        return 0;
    }

    let closed = opportunities
        .iter()
        .filter(|opportunity| opportunity.status == "closed")
        .count();
    (closed as f64 / opportunities.len() as f64 * 100.0).round() as u32
}

pub fn summarize(opportunities: &[Opportunity]) -> Summary {
    Summary {
        total_opportunities: opportunities.len(),
        average_score: average_score(opportunities),
        conversion_rate: conversion_rate(opportunities),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{JobCard, Quote, Vehicle};
    use chrono::{TimeZone, Utc};

    pub(crate) fn sample_opportunity(status: &str) -> Opportunity {
        Opportunity {
            id: format!("opp-{status}"),
            kind: "individual".to_string(),
            subject: "Car Service".to_string(),
            source: "website".to_string(),
            status: status.to_string(),
            customer: None,
            vehicles: Vec::new(),
            job_cards: Vec::new(),
            waivers: Vec::new(),
            quotes: Vec::new(),
            assigned_to: None,
            created_at: Utc.with_ymd_and_hms(2026, 2, 4, 10, 30, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn status_bonuses_follow_expected_values() {
        assert_eq!(score(&sample_opportunity("qualified")), 65);
        assert_eq!(score(&sample_opportunity("closed")), 55);
        assert_eq!(score(&sample_opportunity("new")), 25);
        assert_eq!(score(&sample_opportunity("proposal")), 25);
    }

    #[test]
    fn status_bonus_is_case_sensitive() {
        assert_eq!(score(&sample_opportunity("Qualified")), 25);
    }

    #[test]
    fn every_bonus_stacks_and_clamps_at_hundred() {
        let mut opportunity = sample_opportunity("qualified");
        opportunity.vehicles.push(Vehicle::default());
        opportunity.quotes.push(Quote::default());
        opportunity.job_cards.push(JobCard::default());
        opportunity.assigned_to = Some("staff-1".to_string());

        // 25 + 40 + 15 + 20 + 10 + 5 = 115
        assert_eq!(score(&opportunity), 100);
    }

    #[test]
    fn adding_a_bonus_condition_never_lowers_the_score() {
        for status in ["new", "contacted", "qualified", "proposal", "closed", "unknown"] {
            let base = sample_opportunity(status);
            let before = score(&base);

            let mut with_vehicle = base.clone();
            with_vehicle.vehicles.push(Vehicle::default());
            let mut with_quote = base.clone();
            with_quote.quotes.push(Quote::default());
            let mut with_job_card = base.clone();
            with_job_card.job_cards.push(JobCard::default());
            let mut with_assignee = base.clone();
            with_assignee.assigned_to = Some("staff-2".to_string());

            for variant in [with_vehicle, with_quote, with_job_card, with_assignee] {
                let after = score(&variant);
                assert!(after >= before);
                assert!(after <= 100);
            }
        }
    }

    #[test]
    fn empty_assignee_earns_no_bonus() {
        let mut opportunity = sample_opportunity("new");
        opportunity.assigned_to = Some(String::new());
        assert_eq!(score(&opportunity), 25);
    }

    #[test]
    fn summary_matches_mixed_statuses() {
        let opportunities = vec![
            sample_opportunity("qualified"),
            sample_opportunity("closed"),
            sample_opportunity("new"),
        ];

        let summary = summarize(&opportunities);
        assert_eq!(summary.total_opportunities, 3);
        assert_eq!(summary.average_score, 48);
        assert_eq!(summary.conversion_rate, 33);
    }

    #[test]
    fn empty_list_summarizes_to_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_opportunities, 0);
        assert_eq!(summary.average_score, 0);
        assert_eq!(summary.conversion_rate, 0);
    }
}
