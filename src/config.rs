use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

pub const DEFAULT_API_BASE: &str = "https://mag-backend-0gn4.onrender.com/api/v1";
pub const DEFAULT_TOKEN_FILE: &str = ".dashboard_token";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub token_path: PathBuf,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_base = lookup("OPPORTUNITY_API_BASE")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let token_path = lookup("DASHBOARD_TOKEN_FILE")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE));

        let timeout_secs = match lookup("DASHBOARD_HTTP_TIMEOUT_SECS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .context("DASHBOARD_HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            api_base,
            token_path,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.token_path, PathBuf::from(DEFAULT_TOKEN_FILE));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_are_read() {
        let config = config_from(&[
            ("OPPORTUNITY_API_BASE", "http://localhost:4000/api/v1"),
            ("DASHBOARD_TOKEN_FILE", "/tmp/token"),
            ("DASHBOARD_HTTP_TIMEOUT_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(config.api_base, "http://localhost:4000/api/v1");
        assert_eq!(config.token_path, PathBuf::from("/tmp/token"));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_timeout() {
        assert!(config_from(&[("DASHBOARD_HTTP_TIMEOUT_SECS", "soon")]).is_err());
    }
}
