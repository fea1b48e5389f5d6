//! Storefront REST API client.
//!
//! # Architecture
//!
//! - `reqwest` for HTTP, one attempt per call, no retries
//! - Responses are wrapped as `{"data": ...}`; failures carry `{"message": ...}`
//! - Catalog reads (collections, categories, settings, variant groups) are
//!   cached in memory via `moka`; account data never is
//!
//! # Example
//!
//! ```rust,ignore
//! use bazaar_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config, state.token()?)?;
//!
//! let tree = client.get_category_tree().await?;
//! let settings = client.get_settings().await?;
//! let address = client.create_address(&form).await?;
//! ```

mod cache;
pub mod types;

use std::sync::Arc;

use bazaar_core::{AddressId, VariantGroupId};
use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::catalog::{Category, CategoryTree, Collection, VariantGroup, organize_categories};
use crate::config::{StorefrontConfig, with_trailing_slash};
use crate::error::AppError;
use crate::settings::{RawSetting, Settings, parse_settings};
use crate::validation::{AddressForm, FormMode, validate_address_form};

use cache::{CacheKey, CacheValue};
pub use types::Address;
use types::{Envelope, ErrorBody};

/// Shown when the server gives no usable error message.
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors that can occur when calling the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The form was rejected locally and never sent.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl ApiError {
    /// HTTP status if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront REST API.
///
/// Cheap to clone; clones share the connection pool and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
    cache: Option<Cache<CacheKey, CacheValue>>,
}

impl ApiClient {
    /// Create a client. `token` is sent as a bearer token when present.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig, token: Option<SecretString>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        let cache = (!config.cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(100)
                .time_to_live(config.cache_ttl)
                .build()
        });

        let base_url = with_trailing_slash(&config.api_url);

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url,
                token,
                cache,
            }),
        })
    }

    /// Drop every cached catalog response.
    pub fn invalidate_cache(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.invalidate_all();
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        let mut request = self
            .inner
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token.expose_secret());
        }
        Ok(request)
    }

    /// Send a request and return the raw body of a successful response.
    async fn send_raw(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "Storefront API returned non-success status"
            );
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(body)
    }

    /// Send a request and unwrap the `data` envelope.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send_raw(request).await?;
        let envelope: Envelope<T> = serde_json::from_str(&body).inspect_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse storefront API response"
            );
        })?;
        Ok(envelope.data)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::GET, path)?).await
    }

    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        let value = self.inner.cache.as_ref()?.get(key).await;
        if value.is_some() {
            debug!(key = ?key, "Cache hit");
        }
        value
    }

    async fn store(&self, key: CacheKey, value: CacheValue) {
        if let Some(cache) = &self.inner.cache {
            cache.insert(key, value).await;
        }
    }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    /// Fetch merchandising collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn get_collections(&self) -> Result<Vec<Collection>, ApiError> {
        if let Some(CacheValue::Collections(collections)) =
            self.cached(&CacheKey::Collections).await
        {
            return Ok(collections.as_ref().clone());
        }

        let collections: Vec<Collection> = self.get("collections").await?;
        self.store(
            CacheKey::Collections,
            CacheValue::Collections(Arc::new(collections.clone())),
        )
        .await;
        Ok(collections)
    }

    /// Fetch the flat category list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) = self.cached(&CacheKey::Categories).await
        {
            return Ok(categories.as_ref().clone());
        }

        let categories: Vec<Category> = self.get("categories").await?;
        self.store(
            CacheKey::Categories,
            CacheValue::Categories(Arc::new(categories.clone())),
        )
        .await;
        Ok(categories)
    }

    /// Fetch categories and organise them into navigation views.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the category data is
    /// inconsistent (missing parent, cycle).
    pub async fn get_category_tree(&self) -> Result<CategoryTree, AppError> {
        let categories = self.get_categories().await?;
        Ok(organize_categories(&categories)?)
    }

    /// Fetch and parse storefront settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn get_settings(&self) -> Result<Settings, ApiError> {
        if let Some(CacheValue::Settings(settings)) = self.cached(&CacheKey::Settings).await {
            return Ok(settings.as_ref().clone());
        }

        let rows: Vec<RawSetting> = self.get("settings").await?;
        let settings = parse_settings(&rows);
        self.store(
            CacheKey::Settings,
            CacheValue::Settings(Arc::new(settings.clone())),
        )
        .await;
        Ok(settings)
    }

    /// Fetch a variant group.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn get_variant_group(&self, id: VariantGroupId) -> Result<VariantGroup, ApiError> {
        let key = CacheKey::VariantGroup(id);
        if let Some(CacheValue::VariantGroup(group)) = self.cached(&key).await {
            return Ok(group.as_ref().clone());
        }

        let group: VariantGroup = self.get(&format!("variant-groups/{id}")).await?;
        self.store(key, CacheValue::VariantGroup(Arc::new(group.clone())))
            .await;
        Ok(group)
    }

    // -------------------------------------------------------------------------
    // Addresses
    // -------------------------------------------------------------------------

    /// List the signed-in shopper's addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn get_addresses(&self) -> Result<Vec<Address>, ApiError> {
        self.get("addresses").await
    }

    /// Validate and create an address.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] without sending anything if the form
    /// is invalid, otherwise any request or parse error.
    #[instrument(skip(self, form))]
    pub async fn create_address(&self, form: &AddressForm) -> Result<Address, ApiError> {
        check_form(form, FormMode::Create)?;
        self.send(self.request(Method::POST, "addresses")?.json(form))
            .await
    }

    /// Validate and update an address.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] without sending anything if the form
    /// is invalid, otherwise any request or parse error.
    #[instrument(skip(self, form))]
    pub async fn update_address(
        &self,
        id: AddressId,
        form: &AddressForm,
    ) -> Result<Address, ApiError> {
        check_form(form, FormMode::Update)?;
        self.send(
            self.request(Method::PUT, &format!("addresses/{id}"))?
                .json(form),
        )
        .await
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_address(&self, id: AddressId) -> Result<(), ApiError> {
        self.send_raw(self.request(Method::DELETE, &format!("addresses/{id}"))?)
            .await?;
        Ok(())
    }
}

fn check_form(form: &AddressForm, mode: FormMode) -> Result<(), ApiError> {
    let errors = validate_address_form(form, mode);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// Server-supplied message from an error body, or the fallback.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}

/// Whether an error means the shopper must sign in again.
#[must_use]
pub fn is_unauthorized(err: &ApiError) -> bool {
    err.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_server() {
        assert_eq!(
            error_message(r#"{"message": "The postcode field is required."}"#),
            "The postcode field is required."
        );
    }

    #[test]
    fn test_error_message_fallback() {
        assert_eq!(error_message(""), FALLBACK_ERROR_MESSAGE);
        assert_eq!(error_message("<html>502</html>"), FALLBACK_ERROR_MESSAGE);
        assert_eq!(error_message(r#"{"message": ""}"#), FALLBACK_ERROR_MESSAGE);
        assert_eq!(error_message(r#"{"error": "x"}"#), FALLBACK_ERROR_MESSAGE);
    }

    #[test]
    fn test_api_error_display_is_message() {
        let err = ApiError::Api {
            status: 422,
            message: "Invalid city".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid city");
        assert_eq!(err.status(), Some(422));
        assert!(!is_unauthorized(&err));

        let err = ApiError::Api {
            status: 401,
            message: FALLBACK_ERROR_MESSAGE.to_string(),
        };
        assert!(is_unauthorized(&err));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ApiError::Validation(vec!["A".to_string(), "B".to_string()]);
        assert_eq!(err.to_string(), "Validation failed: A; B");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let config = StorefrontConfig::from_lookup(|key| {
            (key == "STOREFRONT_API_URL").then(|| "https://api.bazaar.test/v1".to_string())
        })
        .unwrap();
        let client = ApiClient::new(&config, None).unwrap();
        assert_eq!(
            client.endpoint("variant-groups/4").unwrap().as_str(),
            "https://api.bazaar.test/v1/variant-groups/4"
        );
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_sent() {
        // Port 9 (discard) is never reached: validation fails first.
        let config = StorefrontConfig::from_lookup(|key| {
            (key == "STOREFRONT_API_URL").then(|| "http://127.0.0.1:9/".to_string())
        })
        .unwrap();
        let client = ApiClient::new(&config, None).unwrap();

        let err = client
            .create_address(&AddressForm::default())
            .await
            .unwrap_err();
        match err {
            ApiError::Validation(errors) => assert_eq!(errors.len(), 6),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
