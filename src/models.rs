use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One lead as delivered by the backend. Only `createdAt` is required; any
/// other field that is missing, `null` or of the wrong type takes its default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "lenient")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient")]
    pub subject: String,
    #[serde(default, deserialize_with = "lenient")]
    pub source: String,
    #[serde(alias = "stage", default, deserialize_with = "lenient")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient")]
    pub customer: Option<Customer>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub vehicles: Vec<Vehicle>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub job_cards: Vec<JobCard>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub waivers: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub quotes: Vec<Quote>,
    #[serde(default, deserialize_with = "assignee_id")]
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Opportunity {
    pub fn is_assigned(&self) -> bool {
        self.assigned_to.as_deref().is_some_and(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    #[serde(rename = "_id", alias = "id", deserialize_with = "lenient")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    #[serde(deserialize_with = "lenient")]
    pub email: String,
    #[serde(deserialize_with = "lenient")]
    pub phone: String,
    #[serde(deserialize_with = "lenient")]
    pub company_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Vehicle {
    #[serde(rename = "_id", alias = "id", deserialize_with = "lenient")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub vin: String,
    #[serde(deserialize_with = "lenient")]
    pub registration_number: String,
    #[serde(deserialize_with = "lenient")]
    pub make: String,
    #[serde(deserialize_with = "lenient")]
    pub model: String,
    #[serde(deserialize_with = "lenient")]
    pub year: Option<i32>,
    #[serde(deserialize_with = "lenient")]
    pub color: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobCard {
    #[serde(rename = "_id", alias = "id", deserialize_with = "lenient")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub job_title: String,
    #[serde(deserialize_with = "lenient")]
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Quote {
    #[serde(rename = "_id", alias = "id", deserialize_with = "lenient")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub quote_number: String,
    #[serde(deserialize_with = "lenient")]
    pub total_amount: f64,
    #[serde(deserialize_with = "lenient")]
    pub status: String,
}

/// Any JSON value; `null` or a value of the wrong type becomes `T::default()`.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Sub-record lists are counted, not inspected: every element is kept, and
/// one that does not fit `T` becomes `T::default()`. A non-list is empty.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

/// `assignedTo` arrives either as a bare staff id or as a populated staff
/// document; only the id is kept.
fn assignee_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(id)) => Some(id),
        Some(Value::Object(map)) => map
            .get("_id")
            .or_else(|| map.get("id"))
            .and_then(|id| id.as_str())
            .map(str::to_string),
        _ => None,
    })
}

/// Where a batch of opportunities came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Provenance {
    #[serde(rename = "live")]
    Live,
    #[serde(rename = "demo-no-auth")]
    DemoNoAuth,
    #[serde(rename = "demo-fallback")]
    DemoFallback,
    #[serde(rename = "demo-error")]
    DemoError,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Live => "live",
            Provenance::DemoNoAuth => "demo-no-auth",
            Provenance::DemoFallback => "demo-fallback",
            Provenance::DemoError => "demo-error",
        }
    }

    pub fn is_demo(&self) -> bool {
        !matches!(self, Provenance::Live)
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Headline figures shown above the charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_opportunities: usize,
    pub average_score: u32,
    pub conversion_rate: u32,
}
