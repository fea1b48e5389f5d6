//! Integration tests for the Bazaar storefront data layer.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```
//!
//! No external services are needed: each test binds an in-process `axum`
//! stub on `127.0.0.1:0` standing in for the storefront API or the
//! currency providers, and points a [`StorefrontConfig`] at it.
//!
//! # Test Categories
//!
//! - `api_client` - REST client, caching, error messages, bearer auth
//! - `currency` - Rate lookups, location detection, fallbacks

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use bazaar_storefront::config::{ConfigError, StorefrontConfig};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// An `axum` router served on an ephemeral local port.
///
/// The server task is aborted when the stub is dropped.
pub struct StubServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl StubServer {
    /// Bind `127.0.0.1:0` and serve `router` in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn spawn(router: Router) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!(error = %e, "Stub server stopped");
            }
        });
        Ok(Self { addr, task })
    }

    /// Address the stub is listening on.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// URL of `path` on the stub.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not form a valid URL.
    pub fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!("http://{}{path}", self.addr))
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Counts requests a stub handler receives.
#[derive(Debug, Clone, Default)]
pub struct HitCounter(Arc<AtomicUsize>);

impl HitCounter {
    /// Record one request.
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    /// Requests recorded so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Configuration pointing the API client at `api_url`, plus any overrides.
///
/// # Errors
///
/// Returns an error if a value is invalid.
pub fn config_with(
    api_url: &Url,
    overrides: &[(&str, &str)],
) -> Result<StorefrontConfig, ConfigError> {
    let api_url = api_url.to_string();
    StorefrontConfig::from_lookup(|key| {
        overrides
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| (*v).to_string())
            .or_else(|| (key == "STOREFRONT_API_URL").then(|| api_url.clone()))
    })
}

/// Configuration pointing every currency provider at `base`.
///
/// # Errors
///
/// Returns an error if a value is invalid.
pub fn currency_config(base: &Url) -> Result<StorefrontConfig, ConfigError> {
    let base = base.as_str();
    config_with(
        &Url::parse("http://127.0.0.1:9/").map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_API_URL".to_string(), e.to_string())
        })?,
        &[
            ("EXCHANGERATE_HOST_URL", base),
            ("OPEN_ER_API_URL", base),
            ("GEOIP_URL", base),
        ],
    )
}
