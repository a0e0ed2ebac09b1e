use chrono::Local;
use rand::Rng;
use serde_json::Value;

use crate::api::{ApiError, OpportunityApi};
use crate::demo;
use crate::models::{Opportunity, Provenance};
use crate::session::SessionContext;

/// Opportunities for one fetch, tagged with where they came from.
#[derive(Debug)]
pub struct Resolution {
    pub opportunities: Vec<Opportunity>,
    pub provenance: Provenance,
    /// Failure absorbed while fetching, kept for display.
    pub failure: Option<ApiError>,
}

impl Resolution {
    fn demo<R: Rng + ?Sized>(rng: &mut R, provenance: Provenance, failure: Option<ApiError>) -> Self {
        Self {
            opportunities: demo::generate(rng, Local::now()),
            provenance,
            failure,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        self.failure.as_ref().is_some_and(ApiError::is_auth_failure)
    }
}

/// Signs in and returns the session carrying the new token. Unlike fetches,
/// every failure here is returned to the caller.
pub async fn login<A>(
    session: SessionContext,
    api: &A,
    email: &str,
    password: &str,
) -> Result<SessionContext, ApiError>
where
    A: OpportunityApi + ?Sized,
{
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::MissingCredentials);
    }

    let token = api.login(email, password).await?;
    log::info!("Login successful for {}", email);
    Ok(session.with_token(token))
}

/// Fetches live opportunities, or substitutes synthetic ones when there is no
/// token or the backend cannot deliver. Never fails.
pub async fn resolve<A, R>(
    session: SessionContext,
    api: &A,
    rng: &mut R,
) -> (SessionContext, Resolution)
where
    A: OpportunityApi + ?Sized,
    R: Rng + ?Sized,
{
    let Some(token) = session.token.clone() else {
        log::info!("No token available; showing demo data");
        let resolution = Resolution::demo(rng, Provenance::DemoNoAuth, None);
        return (session.with_provenance(resolution.provenance), resolution);
    };

    log::info!("Fetching opportunities with token...");
    let resolution = match api.fetch_opportunities(&token).await {
        Ok(body) => match parse_opportunities(body) {
            Ok(opportunities) => {
                log::info!("Opportunities data received: {} items", opportunities.len());
                Resolution {
                    opportunities,
                    provenance: Provenance::Live,
                    failure: None,
                }
            }
            Err(err) => {
                log::warn!("Backend returned an unexpected shape, using demo data: {}", err);
                Resolution::demo(rng, Provenance::DemoFallback, Some(err))
            }
        },
        Err(err) => {
            log::warn!("Fetching opportunities failed, using demo data: {}", err);
            Resolution::demo(rng, Provenance::DemoError, Some(err))
        }
    };

    (session.with_provenance(resolution.provenance), resolution)
}

/// Accepts a JSON array of objects that each carry a valid `createdAt`; the
/// rest of each record is read with defaults.
fn parse_opportunities(body: Value) -> Result<Vec<Opportunity>, ApiError> {
    let Value::Array(items) = body else {
        return Err(ApiError::UnexpectedBody(format!(
            "expected a list of opportunities, got {}",
            kind_of(&body)
        )));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|err| {
                ApiError::UnexpectedBody(format!("opportunity #{index} is malformed: {err}"))
            })
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
