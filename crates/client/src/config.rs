//! Environment-driven client configuration.

use anyhow::{Context, Result, bail};
use tracing::warn;

pub const USER_API_URL_ENV: &str = "USER_API_URL";
pub const USER_API_VER_ENV: &str = "USER_API_VER";
pub const ALLOW_INSECURE_ENV: &str = "KFS_ALLOW_INSECURE_HTTP";

pub const DEFAULT_API_VERSION: &str = "v1";

/// Where the user API lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub api_version: String,
    /// Permit plain `http` endpoints (local development and tests).
    pub allow_insecure: bool,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_version: api_version.into(),
            allow_insecure: false,
        }
    }

    pub fn with_allow_insecure(mut self, allow: bool) -> Self {
        self.allow_insecure = allow;
        self
    }

    /// Read `USER_API_URL`, `USER_API_VER` and `KFS_ALLOW_INSECURE_HTTP`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup(USER_API_URL_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .with_context(|| format!("{USER_API_URL_ENV} must be set"))?;
        url::Url::parse(&api_url)
            .with_context(|| format!("{USER_API_URL_ENV} is not a valid URL: {api_url}"))?;

        let api_version = lookup(USER_API_VER_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let allow_insecure = match lookup(ALLOW_INSECURE_ENV) {
            None => false,
            Some(raw) => match parse_flag(&raw) {
                Some(flag) => flag,
                None => {
                    warn!(value = %raw, "{ALLOW_INSECURE_ENV} is not a boolean; defaulting to false");
                    false
                }
            },
        };

        if !allow_insecure && api_url.starts_with("http://") {
            bail!("{USER_API_URL_ENV} uses plain http; set {ALLOW_INSECURE_ENV}=true to allow it");
        }

        Ok(Self {
            api_url,
            api_version,
            allow_insecure,
        })
    }

    /// Versioned base endpoint, e.g. `https://api.example.com/v1`.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            self.api_version.trim_matches('/')
        )
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn version_defaults_to_v1() {
        let config = ClientConfig::from_lookup(lookup(&[(USER_API_URL_ENV, "https://api.example.com/")])).unwrap();
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.endpoint(), "https://api.example.com/v1");
        assert!(!config.allow_insecure);
    }

    #[test]
    fn url_is_required_and_must_parse() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains(USER_API_URL_ENV));

        assert!(ClientConfig::from_lookup(lookup(&[(USER_API_URL_ENV, "::nope::")])).is_err());
    }

    #[test]
    fn plain_http_needs_the_insecure_flag() {
        let vars = [(USER_API_URL_ENV, "http://127.0.0.1:9000")];
        assert!(ClientConfig::from_lookup(lookup(&vars)).is_err());

        let vars = [
            (USER_API_URL_ENV, "http://127.0.0.1:9000"),
            (USER_API_VER_ENV, "v2"),
            (ALLOW_INSECURE_ENV, "TRUE"),
        ];
        let config = ClientConfig::from_lookup(lookup(&vars)).unwrap();
        assert!(config.allow_insecure);
        assert_eq!(config.endpoint(), "http://127.0.0.1:9000/v2");
    }

    #[test]
    fn unrecognised_flag_falls_back_to_false() {
        assert_eq!(parse_flag("maybe"), None);
        let vars = [(USER_API_URL_ENV, "https://api.example.com"), (ALLOW_INSECURE_ENV, "maybe")];
        assert!(!ClientConfig::from_lookup(lookup(&vars)).unwrap().allow_insecure);
    }
}
