//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_API_URL` - Base URL of the storefront REST API
//!
//! ## Optional
//! - `STOREFRONT_DEFAULT_CURRENCY` - Currency when none is saved (default: USD)
//! - `STOREFRONT_DEFAULT_LANG` - Locale when none is saved (default: en)
//! - `STOREFRONT_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `STOREFRONT_CACHE_TTL_SECS` - Catalog response cache TTL (default: 300)
//! - `STOREFRONT_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `STOREFRONT_STATE_FILE` - Path of the persisted shopper state file
//! - `EXCHANGERATE_HOST_URL` - Conversion endpoint (default: <https://api.exchangerate.host>)
//! - `OPEN_ER_API_URL` - Rate table endpoint (default: <https://open.er-api.com>)
//! - `GEOIP_URL` - Visitor location endpoint (default: <https://freegeoip.app>)

use std::path::PathBuf;
use std::time::Duration;

use bazaar_core::CurrencyCode;
use thiserror::Error;
use url::Url;

use crate::storage::StateDefaults;
use crate::telemetry::LogFormat;

const DEFAULT_EXCHANGERATE_HOST_URL: &str = "https://api.exchangerate.host";
const DEFAULT_OPEN_ER_API_URL: &str = "https://open.er-api.com";
const DEFAULT_GEOIP_URL: &str = "https://freegeoip.app";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the storefront REST API
    pub api_url: Url,
    /// Currency used when the shopper has none saved
    pub default_currency: CurrencyCode,
    /// Locale used when the shopper has none saved
    pub default_lang: String,
    /// Timeout applied to every outgoing request
    pub http_timeout: Duration,
    /// How long catalog responses stay cached
    pub cache_ttl: Duration,
    /// Log output format
    pub log_format: LogFormat,
    /// Where shopper state is persisted (in memory when unset)
    pub state_file: Option<PathBuf>,
    /// Third-party currency endpoints
    pub currency: CurrencyEndpoints,
}

/// Base URLs of the currency and location providers.
#[derive(Debug, Clone)]
pub struct CurrencyEndpoints {
    /// exchangerate.host, serves `/convert`
    pub exchangerate_host: Url,
    /// open.er-api.com, serves `/v6/latest/{base}`
    pub open_er_api: Url,
    /// freegeoip.app, serves `/json/`
    pub geoip: Url,
}

impl Default for CurrencyEndpoints {
    fn default() -> Self {
        Self {
            exchangerate_host: default_url(DEFAULT_EXCHANGERATE_HOST_URL),
            open_er_api: default_url(DEFAULT_OPEN_ER_API_URL),
            geoip: default_url(DEFAULT_GEOIP_URL),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let api_url = env.url("STOREFRONT_API_URL", None)?;
        let default_currency = {
            let raw = env.or_default("STOREFRONT_DEFAULT_CURRENCY", "USD");
            CurrencyCode::parse(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_DEFAULT_CURRENCY".to_string(), e.to_string())
            })?
        };
        let default_lang = env.or_default("STOREFRONT_DEFAULT_LANG", "en");
        let http_timeout = Duration::from_secs(env.parse_or("STOREFRONT_HTTP_TIMEOUT_SECS", 10)?);
        let cache_ttl = Duration::from_secs(env.parse_or("STOREFRONT_CACHE_TTL_SECS", 300)?);
        let log_format = env
            .or_default("STOREFRONT_LOG_FORMAT", "pretty")
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_LOG_FORMAT".to_string(), e))?;
        let state_file = env.optional("STOREFRONT_STATE_FILE").map(PathBuf::from);

        let currency = CurrencyEndpoints {
            exchangerate_host: env
                .url("EXCHANGERATE_HOST_URL", Some(DEFAULT_EXCHANGERATE_HOST_URL))?,
            open_er_api: env.url("OPEN_ER_API_URL", Some(DEFAULT_OPEN_ER_API_URL))?,
            geoip: env.url("GEOIP_URL", Some(DEFAULT_GEOIP_URL))?,
        };

        Ok(Self {
            api_url,
            default_currency,
            default_lang,
            http_timeout,
            cache_ttl,
            log_format,
            state_file,
            currency,
        })
    }

    /// Defaults for [`crate::storage::LocalState`].
    #[must_use]
    pub fn state_defaults(&self) -> StateDefaults {
        StateDefaults {
            currency: self.default_currency,
            lang: self.default_lang.clone(),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a compile-time URL constant.
fn default_url(raw: &str) -> Url {
    Url::parse(raw).unwrap_or_else(|e| unreachable!("invalid built-in URL {raw}: {e}"))
}

/// Copy of `url` whose path ends in `/`.
///
/// `Url::join` replaces the last path segment unless it ends with `/`, so
/// base URLs with a path prefix must be normalised before joining.
pub(crate) fn with_trailing_slash(url: &Url) -> Url {
    let mut url = url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Typed reads over a key lookup.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable; empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    /// Get a URL, required when `default` is `None`.
    fn url(&self, key: &str, default: Option<&str>) -> Result<Url, ConfigError> {
        let raw = match default {
            Some(default) => self.or_default(key, default),
            None => self.required(key)?,
        };
        Url::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("STOREFRONT_API_URL", "https://api.bazaar.test/v1/")]).unwrap();

        assert_eq!(config.api_url.as_str(), "https://api.bazaar.test/v1/");
        assert_eq!(config.default_currency, CurrencyCode::USD);
        assert_eq!(config.default_lang, "en");
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.state_file.is_none());
        assert_eq!(
            config.currency.open_er_api.as_str(),
            "https://open.er-api.com/"
        );
    }

    #[test]
    fn test_missing_api_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "STOREFRONT_API_URL"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STOREFRONT_API_URL", "http://localhost:8000/api/"),
            ("STOREFRONT_DEFAULT_CURRENCY", "jod"),
            ("STOREFRONT_DEFAULT_LANG", "ar"),
            ("STOREFRONT_HTTP_TIMEOUT_SECS", "3"),
            ("STOREFRONT_CACHE_TTL_SECS", "0"),
            ("STOREFRONT_LOG_FORMAT", "json"),
            ("STOREFRONT_STATE_FILE", "/tmp/bazaar.json"),
            ("GEOIP_URL", "http://127.0.0.1:9000"),
        ])
        .unwrap();

        assert_eq!(config.default_currency.as_str(), "JOD");
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert_eq!(config.cache_ttl, Duration::ZERO);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.state_file, Some(PathBuf::from("/tmp/bazaar.json")));
        assert_eq!(config.currency.geoip.as_str(), "http://127.0.0.1:9000/");

        let defaults = config.state_defaults();
        assert_eq!(defaults.lang, "ar");
        assert_eq!(defaults.currency.as_str(), "JOD");
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[
            ("STOREFRONT_API_URL", "https://api.bazaar.test/"),
            ("STOREFRONT_HTTP_TIMEOUT_SECS", "soon"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_HTTP_TIMEOUT_SECS"));

        let err = load(&[("STOREFRONT_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = load(&[
            ("STOREFRONT_API_URL", "https://api.bazaar.test/"),
            ("STOREFRONT_DEFAULT_CURRENCY", "dollars"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_DEFAULT_CURRENCY"));
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = load(&[
            ("STOREFRONT_API_URL", "https://api.bazaar.test/"),
            ("STOREFRONT_DEFAULT_LANG", "  "),
        ])
        .unwrap();
        assert_eq!(config.default_lang, "en");
    }

    #[test]
    fn test_with_trailing_slash_keeps_prefix() {
        let url = Url::parse("http://proxy.test/fx").unwrap();
        let base = with_trailing_slash(&url);
        assert_eq!(base.as_str(), "http://proxy.test/fx/");
        assert_eq!(
            base.join("convert").unwrap().as_str(),
            "http://proxy.test/fx/convert"
        );

        let root = Url::parse("https://open.er-api.com").unwrap();
        assert_eq!(with_trailing_slash(&root).as_str(), "https://open.er-api.com/");
    }

    #[test]
    fn test_default_endpoints() {
        let endpoints = CurrencyEndpoints::default();
        assert_eq!(endpoints.exchangerate_host.host_str(), Some("api.exchangerate.host"));
        assert_eq!(endpoints.geoip.host_str(), Some("freegeoip.app"));
    }
}
