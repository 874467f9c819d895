//! Endpoint configuration for the prediction client.

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use crate::util::version::user_agent;

/// Base URL of the prediction service, e.g. `https://fruit-api.example.com`.
pub const API_URL_ENV: &str = "FRUIT_PRICE_API_URL";
/// Optional request timeout override in seconds.
pub const TIMEOUT_ENV: &str = "FRUIT_PRICE_TIMEOUT_SECS";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingVar(&'static str),
    #[error("invalid service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unsupported URL scheme '{0}', expected http or https")]
    UnsupportedScheme(String),
    #[error("invalid timeout '{0}', expected a positive number of seconds")]
    InvalidTimeout(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: Url,
    timeout: Duration,
    user_agent: String,
}

impl ClientConfig {
    /// Validates `base_url` and normalizes it to end with `/` so endpoint
    /// paths resolve underneath it rather than replacing its last segment.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let mut url = Url::parse(base_url.trim())?;
        let scheme = url.scheme().to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(ConfigError::UnsupportedScheme(scheme));
        }

        url.set_query(None);
        url.set_fragment(None);
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self {
            base_url: url,
            timeout: DEFAULT_TIMEOUT,
            user_agent: user_agent(),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, using the same keys as
    /// [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(API_URL_ENV)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingVar(API_URL_ENV))?;
        let config = Self::new(&base_url)?;

        match lookup(TIMEOUT_ENV).filter(|value| !value.trim().is_empty()) {
            Some(raw) => Ok(config.with_timeout(parse_timeout_secs(&raw)?)),
            None => Ok(config),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

pub fn parse_timeout_secs(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs > 0.0 && secs <= u32::MAX as f64 => {
            Ok(Duration::from_secs_f64(secs))
        }
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let config = ClientConfig::new("https://api.example.com/v2").unwrap();
        assert_eq!(config.base_url().as_str(), "https://api.example.com/v2/");
        assert_eq!(
            config.base_url().join("predict").unwrap().as_str(),
            "https://api.example.com/v2/predict"
        );

        let config = ClientConfig::new("http://localhost:8000").unwrap();
        assert_eq!(config.base_url().as_str(), "http://localhost:8000/");
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert_eq!(
            ClientConfig::new("ftp://example.com"),
            Err(ConfigError::UnsupportedScheme("ftp".into()))
        );
        assert!(matches!(
            ClientConfig::new("not a url"),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn defaults_to_fifteen_second_timeout() {
        let config = ClientConfig::new("https://api.example.com").unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert!(config.user_agent().starts_with("fruit-price-predictor/"));
    }

    #[test]
    fn lookup_requires_api_url() {
        assert_eq!(
            ClientConfig::from_lookup(lookup(&[])),
            Err(ConfigError::MissingVar(API_URL_ENV))
        );
        assert_eq!(
            ClientConfig::from_lookup(lookup(&[(API_URL_ENV, "   ")])),
            Err(ConfigError::MissingVar(API_URL_ENV))
        );
    }

    #[test]
    fn lookup_reads_timeout_override() {
        let config = ClientConfig::from_lookup(lookup(&[
            (API_URL_ENV, "https://api.example.com"),
            (TIMEOUT_ENV, "2.5"),
        ]))
        .unwrap();
        assert_eq!(config.timeout(), Duration::from_millis(2500));

        let err = ClientConfig::from_lookup(lookup(&[
            (API_URL_ENV, "https://api.example.com"),
            (TIMEOUT_ENV, "-1"),
        ]));
        assert_eq!(err, Err(ConfigError::InvalidTimeout("-1".into())));
    }
}
