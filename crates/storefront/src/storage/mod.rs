//! Client-side persisted state.
//!
//! A browser keeps the wishlist, chosen currency, auth token, and language
//! in local storage. Here that storage is abstracted behind
//! [`KeyValueStore`] and accessed through the [`LocalState`] context so
//! nothing reaches for global state.
//!
//! Writes are read-modify-write without locking across calls; two
//! concurrent wishlist updates can lose one of them.

mod file;
mod local;
mod memory;

pub use file::FileStore;
pub use local::{LocalState, StateDefaults};
pub use memory::MemoryStore;

use thiserror::Error;

use crate::config::StorefrontConfig;

/// Storage key for the wishlist (JSON array of cart items).
pub const WISHLIST_KEY: &str = "wishlist";
/// Storage key for the shopper's ISO currency code.
pub const CURRENCY_KEY: &str = "currency";
/// Storage key for the bearer auth token.
pub const TOKEN_KEY: &str = "token";
/// Storage key for the locale code.
pub const LANG_KEY: &str = "lang";

/// Errors from a key/value store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing data or a stored value is not valid JSON.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store's lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// String key/value storage, modelled on browser local storage.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Open shopper state as configured: file-backed when
/// `STOREFRONT_STATE_FILE` is set, in memory otherwise.
#[must_use]
pub fn open_state(config: &StorefrontConfig) -> LocalState<Box<dyn KeyValueStore>> {
    let store: Box<dyn KeyValueStore> = match &config.state_file {
        Some(path) => Box::new(FileStore::new(path.clone())),
        None => Box::new(MemoryStore::new()),
    };
    LocalState::new(store, config.state_defaults())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_open_state_in_memory_uses_config_defaults() {
        let config = StorefrontConfig::from_lookup(|key| match key {
            "STOREFRONT_API_URL" => Some("https://api.bazaar.test/".to_string()),
            "STOREFRONT_DEFAULT_LANG" => Some("ar".to_string()),
            _ => None,
        })
        .unwrap();

        let state = open_state(&config);
        assert_eq!(state.lang().unwrap(), "ar");
        state.save_lang("en").unwrap();
        assert_eq!(state.lang().unwrap(), "en");
    }

    #[test]
    fn test_open_state_file_backed_round_trip() {
        use bazaar_core::{CurrencyCode, ProductId};
        use rust_decimal::Decimal;

        use crate::catalog::CartItem;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let config = StorefrontConfig::from_lookup(|key| match key {
            "STOREFRONT_API_URL" => Some("https://api.bazaar.test/".to_string()),
            "STOREFRONT_STATE_FILE" => Some(path.display().to_string()),
            _ => None,
        })
        .unwrap();

        let state = open_state(&config);
        state
            .save_user_currency(CurrencyCode::parse("JOD").unwrap())
            .unwrap();
        state
            .add_to_wishlist(CartItem {
                id: ProductId::new(9),
                slug: Some("linen-shirt".to_string()),
                name: "Linen Shirt".to_string(),
                price: Decimal::new(2500, 2),
                original_price: None,
                image: "/img/shirt.jpg".to_string(),
                rating: None,
                tags: Vec::new(),
                stock_availability: true,
                description: String::new(),
                short_description: String::new(),
                attributes: Vec::new(),
                quantity: 1,
            })
            .unwrap();
        assert!(path.exists());

        let reopened = open_state(&config);
        assert_eq!(reopened.saved_user_currency().unwrap().as_str(), "JOD");
        assert!(reopened.is_in_wishlist(ProductId::new(9)).unwrap());
        assert_eq!(reopened.wishlist().unwrap()[0].name, "Linen Shirt");
    }
}
