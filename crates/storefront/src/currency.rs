//! Currency conversion and visitor currency detection.
//!
//! Three third-party services are consulted, each once per call with no
//! retry. Every lookup degrades to a safe default instead of failing the
//! page: a rate of 1, an empty rate table, or `USD`.
//!
//! | Service            | Request                         | Reads            |
//! |--------------------|---------------------------------|------------------|
//! | exchangerate.host  | `/convert?from=&to=&amount=1`   | `result`         |
//! | open.er-api.com    | `/v6/latest/{base}`             | `rates`          |
//! | freegeoip.app      | `/json/`                        | `country_code`   |

use std::collections::HashMap;
use std::sync::Arc;

use bazaar_core::{CurrencyCode, Money};
use moka::future::Cache;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::{CurrencyEndpoints, StorefrontConfig, with_trailing_slash};
use crate::storage::{KeyValueStore, LocalState, StorageError};

/// Rate tables are refreshed at most this often.
const RATE_TABLE_TTL_SECS: u64 = 3600;

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    result: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    #[serde(default)]
    rates: HashMap<String, Decimal>,
}

#[derive(Debug, Deserialize)]
struct GeoIpResponse {
    country_code: Option<String>,
}

/// Errors from a single lookup. Never surfaced: callers fall back instead.
#[derive(Debug, thiserror::Error)]
enum LookupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("status {0}")]
    Status(reqwest::StatusCode),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("missing field {0}")]
    MissingField(&'static str),
}

/// Client for currency rates and visitor location.
#[derive(Clone)]
pub struct CurrencyService {
    inner: Arc<CurrencyServiceInner>,
}

struct CurrencyServiceInner {
    client: reqwest::Client,
    endpoints: CurrencyEndpoints,
    rate_tables: Cache<CurrencyCode, Arc<HashMap<String, Decimal>>>,
}

impl CurrencyService {
    /// Create a service from the storefront configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self::with_client(client, config.currency.clone()))
    }

    /// Create a service with an existing HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, endpoints: CurrencyEndpoints) -> Self {
        let rate_tables = Cache::builder()
            .max_capacity(32)
            .time_to_live(std::time::Duration::from_secs(RATE_TABLE_TTL_SECS))
            .build();

        let endpoints = CurrencyEndpoints {
            exchangerate_host: with_trailing_slash(&endpoints.exchangerate_host),
            open_er_api: with_trailing_slash(&endpoints.open_er_api),
            geoip: with_trailing_slash(&endpoints.geoip),
        };

        Self {
            inner: Arc::new(CurrencyServiceInner {
                client,
                endpoints,
                rate_tables,
            }),
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, LookupError> {
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }
        Ok(response.json().await?)
    }

    async fn fetch_rate(&self, from: CurrencyCode, to: CurrencyCode) -> Result<Decimal, LookupError> {
        let mut url = self.inner.endpoints.exchangerate_host.join("convert")?;
        url.query_pairs_mut()
            .append_pair("from", from.as_str())
            .append_pair("to", to.as_str())
            .append_pair("amount", "1");

        let body: ConvertResponse = self.fetch_json(url).await?;
        body.result.ok_or(LookupError::MissingField("result"))
    }

    /// Units of `to` per unit of `from`, or 1 if the lookup fails.
    #[instrument(skip(self))]
    pub async fn exchange_rate(&self, from: CurrencyCode, to: CurrencyCode) -> Decimal {
        if from == to {
            return Decimal::ONE;
        }

        match self.fetch_rate(from, to).await {
            Ok(rate) => rate,
            Err(e) => {
                warn!(error = %e, "Exchange rate lookup failed, using 1");
                Decimal::ONE
            }
        }
    }

    async fn fetch_rate_table(
        &self,
        base: CurrencyCode,
    ) -> Result<HashMap<String, Decimal>, LookupError> {
        let url = self
            .inner
            .endpoints
            .open_er_api
            .join(&format!("v6/latest/{base}"))?;
        let body: LatestRatesResponse = self.fetch_json(url).await?;
        Ok(body.rates)
    }

    /// Latest rates keyed by ISO code, relative to `base`.
    ///
    /// Successful tables are cached; a failed lookup returns an empty table
    /// and is not cached.
    #[instrument(skip(self))]
    pub async fn latest_rates(&self, base: CurrencyCode) -> Arc<HashMap<String, Decimal>> {
        if let Some(table) = self.inner.rate_tables.get(&base).await {
            debug!("Rate table cache hit");
            return table;
        }

        match self.fetch_rate_table(base).await {
            Ok(rates) => {
                let table = Arc::new(rates);
                self.inner.rate_tables.insert(base, Arc::clone(&table)).await;
                table
            }
            Err(e) => {
                warn!(error = %e, "Rate table lookup failed, using empty table");
                Arc::new(HashMap::new())
            }
        }
    }

    /// Rate for `target` from the `base` rate table, or 1 if unknown.
    pub async fn rate_from_table(&self, base: CurrencyCode, target: CurrencyCode) -> Decimal {
        if base == target {
            return Decimal::ONE;
        }
        self.latest_rates(base)
            .await
            .get(target.as_str())
            .copied()
            .unwrap_or(Decimal::ONE)
    }

    /// Convert an amount using the rate table for its currency.
    pub async fn convert(&self, amount: Money, target: CurrencyCode) -> Money {
        let rate = self.rate_from_table(amount.currency_code, target).await;
        amount.convert(rate, target)
    }

    async fn fetch_country_code(&self) -> Result<String, LookupError> {
        let url = self.inner.endpoints.geoip.join("json/")?;
        let body: GeoIpResponse = self.fetch_json(url).await?;
        body.country_code
            .filter(|code| !code.trim().is_empty())
            .ok_or(LookupError::MissingField("country_code"))
    }

    /// Currency for the visitor's location. Unmapped countries give `USD`.
    async fn lookup_currency(&self) -> Result<CurrencyCode, LookupError> {
        let country = self.fetch_country_code().await?;
        Ok(currency_for_country(&country).unwrap_or_else(|| {
            debug!(country = %country, "No currency mapped for country, using USD");
            CurrencyCode::USD
        }))
    }

    /// Guess the visitor's currency from their location, or `USD`.
    #[instrument(skip(self))]
    pub async fn detect_currency(&self) -> CurrencyCode {
        self.lookup_currency().await.unwrap_or_else(|e| {
            warn!(error = %e, "Location lookup failed, using USD");
            CurrencyCode::USD
        })
    }

    /// The shopper's saved currency, or a detected one which is then saved.
    ///
    /// When the location lookup fails, `USD` is returned but not saved, so
    /// detection runs again next time.
    ///
    /// # Errors
    ///
    /// Returns an error only if the local store cannot be read or written.
    pub async fn resolve_user_currency<S: KeyValueStore>(
        &self,
        state: &LocalState<S>,
    ) -> Result<CurrencyCode, StorageError> {
        if let Some(saved) = state.saved_currency()? {
            return Ok(saved);
        }

        match self.lookup_currency().await {
            Ok(detected) => {
                state.save_user_currency(detected)?;
                Ok(detected)
            }
            Err(e) => {
                warn!(error = %e, "Location lookup failed, using USD without saving");
                Ok(CurrencyCode::USD)
            }
        }
    }
}

/// Local currency for an ISO 3166-1 alpha-2 country code.
#[must_use]
pub fn currency_for_country(country_code: &str) -> Option<CurrencyCode> {
    let code = match country_code.trim().to_ascii_uppercase().as_str() {
        "US" | "EC" | "SV" | "PR" => "USD",
        "JO" | "PS" => "JOD",
        "GB" => "GBP",
        "AT" | "BE" | "CY" | "DE" | "EE" | "ES" | "FI" | "FR" | "GR" | "HR" | "IE" | "IT"
        | "LT" | "LU" | "LV" | "MT" | "NL" | "PT" | "SI" | "SK" => "EUR",
        "AE" => "AED",
        "SA" => "SAR",
        "KW" => "KWD",
        "QA" => "QAR",
        "BH" => "BHD",
        "OM" => "OMR",
        "EG" => "EGP",
        "IQ" => "IQD",
        "LB" => "LBP",
        "TR" => "TRY",
        "CA" => "CAD",
        "AU" => "AUD",
        "CH" => "CHF",
        "JP" => "JPY",
        "CN" => "CNY",
        "IN" => "INR",
        _ => return None,
    };
    CurrencyCode::parse(code).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn jod() -> CurrencyCode {
        CurrencyCode::parse("JOD").unwrap()
    }

    /// Endpoints that refuse connections immediately.
    fn unreachable_service() -> CurrencyService {
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        CurrencyService::with_client(
            reqwest::Client::new(),
            CurrencyEndpoints {
                exchangerate_host: url.clone(),
                open_er_api: url.clone(),
                geoip: url,
            },
        )
    }

    #[test]
    fn test_currency_for_country() {
        assert_eq!(currency_for_country("jo"), Some(jod()));
        assert_eq!(currency_for_country("DE").unwrap().as_str(), "EUR");
        assert_eq!(currency_for_country("US"), Some(CurrencyCode::USD));
        assert_eq!(currency_for_country("ZZ"), None);
    }

    #[tokio::test]
    async fn test_same_currency_needs_no_lookup() {
        let service = unreachable_service();
        assert_eq!(service.exchange_rate(jod(), jod()).await, Decimal::ONE);
        assert_eq!(service.rate_from_table(jod(), jod()).await, Decimal::ONE);
    }

    #[tokio::test]
    async fn test_failures_fall_back_to_defaults() {
        let service = unreachable_service();

        assert_eq!(
            service.exchange_rate(CurrencyCode::USD, jod()).await,
            Decimal::ONE
        );
        assert!(service.latest_rates(CurrencyCode::USD).await.is_empty());
        assert_eq!(service.detect_currency().await, CurrencyCode::USD);

        let price = Money::new(Decimal::new(1000, 2), CurrencyCode::USD);
        let converted = service.convert(price, jod()).await;
        assert_eq!(converted.amount, Decimal::new(1000, 2));
        assert_eq!(converted.currency_code, jod());
    }

    #[tokio::test]
    async fn test_resolve_prefers_saved_currency() {
        use crate::storage::{MemoryStore, StateDefaults};

        let service = unreachable_service();
        let state = LocalState::new(MemoryStore::new(), StateDefaults::default());

        state.save_user_currency(jod()).unwrap();
        assert_eq!(service.resolve_user_currency(&state).await.unwrap(), jod());
    }

    #[tokio::test]
    async fn test_resolve_does_not_save_failed_lookup() {
        use crate::storage::{MemoryStore, StateDefaults};

        let service = unreachable_service();
        let state = LocalState::new(MemoryStore::new(), StateDefaults::default());

        assert_eq!(
            service.resolve_user_currency(&state).await.unwrap(),
            CurrencyCode::USD
        );
        assert_eq!(state.saved_currency().unwrap(), None);
    }
}
