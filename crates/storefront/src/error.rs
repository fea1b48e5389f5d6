//! Unified error handling.
//!
//! Module errors convert into [`AppError`] with `?`. Callers that render
//! errors to shoppers use [`AppError::user_message`], which never exposes
//! internal details.

use bazaar_core::CurrencyCodeError;
use thiserror::Error;

use crate::api::{ApiError, FALLBACK_ERROR_MESSAGE};
use crate::catalog::{CategoryError, ProductError};
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Category data is inconsistent.
    #[error("Category error: {0}")]
    Category(#[from] CategoryError),

    /// Product data cannot be shaped for display.
    #[error("Product error: {0}")]
    Product(#[from] ProductError),

    /// Local state could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Storefront API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration is missing or invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A currency code was rejected.
    #[error("Currency error: {0}")]
    Currency(#[from] CurrencyCodeError),
}

impl AppError {
    /// Message suitable for showing to a shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(ApiError::Api { message, .. }) => message.clone(),
            Self::Api(ApiError::Validation(errors)) => errors.join("\n"),
            Self::Currency(_) => "Unsupported currency".to_string(),
            _ => FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }

    /// Whether the shopper must sign in again.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(err) if crate::api::is_unauthorized(err))
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::{CategoryId, CurrencyCode};

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::from(CategoryError::Cycle {
            category_id: CategoryId::new(4),
        });
        assert!(err.to_string().starts_with("Category error: "));

        let err = AppError::from(ConfigError::MissingEnvVar("STOREFRONT_API_URL".to_string()));
        assert_eq!(
            err.to_string(),
            "Config error: Missing environment variable: STOREFRONT_API_URL"
        );
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = AppError::from(StorageError::Poisoned);
        assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);

        let err = AppError::from(ProductError::EmptyImageSet);
        assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);
    }

    #[test]
    fn test_user_message_passes_server_message() {
        let err = AppError::from(ApiError::Api {
            status: 422,
            message: "Invalid city".to_string(),
        });
        assert_eq!(err.user_message(), "Invalid city");
        assert!(!err.is_unauthorized());

        let err = AppError::from(ApiError::Validation(vec![
            "Full name is required".to_string(),
            "City is required".to_string(),
        ]));
        assert_eq!(err.user_message(), "Full name is required\nCity is required");
    }

    #[test]
    fn test_unauthorized() {
        let err = AppError::from(ApiError::Api {
            status: 401,
            message: "Unauthenticated.".to_string(),
        });
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_currency_error_converts() {
        fn parse(raw: &str) -> Result<CurrencyCode> {
            Ok(CurrencyCode::parse(raw)?)
        }

        let err = parse("dollars").unwrap_err();
        assert!(matches!(err, AppError::Currency(_)));
        assert_eq!(err.user_message(), "Unsupported currency");
    }
}
