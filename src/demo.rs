use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Timelike, Utc};
use rand::Rng;

use crate::models::{Customer, JobCard, Opportunity, Quote, Vehicle};

pub const DEMO_RECORD_COUNT: usize = 48;

const TYPES: [&str; 2] = ["individual", "organization"];
const SOURCES: [&str; 6] = ["website", "referral", "walk_in", "social_media", "email", "manual"];
const STATUSES: [&str; 5] = ["new", "contacted", "qualified", "proposal", "closed"];

const LOOKBACK_DAYS: i64 = 30;
const FIRST_HOUR: u32 = 8;
const LAST_HOUR: u32 = 16;

const VEHICLE_PROBABILITY: f64 = 0.7;
const JOB_CARD_PROBABILITY: f64 = 0.5;
const QUOTE_PROBABILITY: f64 = 0.6;

/// Sample opportunities for the current instant, using the thread RNG.
pub fn generate_demo_data() -> Vec<Opportunity> {
    generate(&mut rand::thread_rng(), Local::now())
}

/// Builds [`DEMO_RECORD_COUNT`] plausible opportunities created within the
/// last thirty days, during business hours of `now`'s timezone.
pub fn generate<R, Tz>(rng: &mut R, now: DateTime<Tz>) -> Vec<Opportunity>
where
    R: Rng + ?Sized,
    Tz: TimeZone,
{
    (1..=DEMO_RECORD_COUNT)
        .map(|n| demo_opportunity(rng, &now, n))
        .collect()
}

fn pick<R: Rng + ?Sized>(rng: &mut R, values: &[&str]) -> String {
    values[rng.gen_range(0..values.len())].to_string()
}

/// `hour` o'clock on `date` in `tz`. A local time that does not exist (a DST
/// gap, or a day the zone skipped) moves to the next hour of the window, then
/// to the day before.
fn business_hours_instant<Tz: TimeZone>(
    tz: &Tz,
    date: NaiveDate,
    hour: u32,
    minute: u32,
    second: u32,
) -> Option<DateTime<Utc>> {
    let window = LAST_HOUR - FIRST_HOUR + 1;
    std::iter::successors(Some(date), |day| day.pred_opt())
        .flat_map(|day| {
            (0..window).map(move |step| (day, FIRST_HOUR + (hour - FIRST_HOUR + step) % window))
        })
        .find_map(|(day, hour)| {
            let naive = day.and_hms_opt(hour, minute, second)?;
            tz.from_local_datetime(&naive).earliest()
        })
        .map(|local| local.with_timezone(&Utc))
}

fn demo_opportunity<R, Tz>(rng: &mut R, now: &DateTime<Tz>, n: usize) -> Opportunity
where
    R: Rng + ?Sized,
    Tz: TimeZone,
{
    let day = now.clone() - Duration::days(rng.gen_range(0..LOOKBACK_DAYS));
    let hour = rng.gen_range(FIRST_HOUR..=LAST_HOUR);
    let created_at = business_hours_instant(
        &now.timezone(),
        day.date_naive(),
        hour,
        now.minute(),
        now.second(),
    )
    // no business hour exists on any earlier local date
    .unwrap_or_else(|| now.with_timezone(&Utc));

    let vehicles = if rng.gen_bool(VEHICLE_PROBABILITY) {
        vec![Vehicle {
            id: format!("vehicle-{n}"),
            vin: format!("VIN{n}"),
            registration_number: format!("REG{n}"),
            make: "Honda".to_string(),
            model: "Civic".to_string(),
            year: Some(2020),
            color: "Blue".to_string(),
        }]
    } else {
        Vec::new()
    };

    let job_cards = if rng.gen_bool(JOB_CARD_PROBABILITY) {
        vec![JobCard {
            id: format!("jobcard-{n}"),
            job_title: "Oil Change Service".to_string(),
            status: "pending".to_string(),
        }]
    } else {
        Vec::new()
    };

    let quotes = if rng.gen_bool(QUOTE_PROBABILITY) {
        vec![Quote {
            id: format!("quote-{n}"),
            quote_number: format!("Q-{}-{n}", created_at.format("%Y")),
            total_amount: 10_000.0,
            status: "pending".to_string(),
        }]
    } else {
        Vec::new()
    };

    Opportunity {
        id: format!("demo-{n}"),
        kind: pick(rng, &TYPES),
        subject: format!("Demo Opportunity {n}"),
        source: pick(rng, &SOURCES),
        status: pick(rng, &STATUSES),
        customer: Some(Customer {
            id: format!("customer-{n}"),
            name: format!("Customer {n}"),
            email: format!("customer{n}@example.com"),
            phone: format!("+123456789{n}"),
            company_name: format!("Company {n}"),
        }),
        vehicles,
        job_cards,
        waivers: Vec::new(),
        quotes,
        assigned_to: None,
        created_at,
        updated_at: Some(created_at),
    }
}
