//! Typed access to persisted shopper state.

use bazaar_core::{CurrencyCode, ProductId};
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use super::{CURRENCY_KEY, KeyValueStore, LANG_KEY, StorageError, TOKEN_KEY, WISHLIST_KEY};
use crate::catalog::CartItem;

/// Values returned when nothing has been saved yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDefaults {
    pub currency: CurrencyCode,
    pub lang: String,
}

impl Default for StateDefaults {
    fn default() -> Self {
        Self {
            currency: CurrencyCode::USD,
            lang: "en".to_string(),
        }
    }
}

/// Shopper state over a [`KeyValueStore`].
///
/// This is the context object passed to code that needs the wishlist,
/// currency, token, or language.
#[derive(Debug)]
pub struct LocalState<S> {
    store: S,
    defaults: StateDefaults,
}

impl<S: KeyValueStore> LocalState<S> {
    /// Wrap a store.
    pub const fn new(store: S, defaults: StateDefaults) -> Self {
        Self { store, defaults }
    }

    /// Borrow the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    // -------------------------------------------------------------------------
    // Wishlist
    // -------------------------------------------------------------------------

    /// Saved wishlist items, oldest first.
    ///
    /// A wishlist that no longer parses is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn wishlist(&self) -> Result<Vec<CartItem>, StorageError> {
        let Some(raw) = self.store.get(WISHLIST_KEY)? else {
            return Ok(Vec::new());
        };

        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "Stored wishlist is corrupt, ignoring it");
            Vec::new()
        }))
    }

    fn save_wishlist(&self, items: &[CartItem]) -> Result<(), StorageError> {
        self.store
            .set(WISHLIST_KEY, &serde_json::to_string(items)?)
    }

    /// Whether a product is on the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn is_in_wishlist(&self, id: ProductId) -> Result<bool, StorageError> {
        Ok(self.wishlist()?.iter().any(|item| item.id == id))
    }

    /// Add an item. Adding a product that is already present does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn add_to_wishlist(&self, item: CartItem) -> Result<(), StorageError> {
        let mut items = self.wishlist()?;
        if items.iter().any(|existing| existing.id == item.id) {
            return Ok(());
        }
        items.push(item);
        self.save_wishlist(&items)
    }

    /// Remove a product. Returns whether it was present.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn remove_from_wishlist(&self, id: ProductId) -> Result<bool, StorageError> {
        let mut items = self.wishlist()?;
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Ok(false);
        }
        self.save_wishlist(&items)?;
        Ok(true)
    }

    /// Add the item if absent, remove it if present. Returns whether it is
    /// on the wishlist afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn toggle_wishlist(&self, item: CartItem) -> Result<bool, StorageError> {
        if self.remove_from_wishlist(item.id)? {
            Ok(false)
        } else {
            self.add_to_wishlist(item)?;
            Ok(true)
        }
    }

    // -------------------------------------------------------------------------
    // Currency
    // -------------------------------------------------------------------------

    /// The saved currency, if a valid one was saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn saved_currency(&self) -> Result<Option<CurrencyCode>, StorageError> {
        Ok(self
            .store
            .get(CURRENCY_KEY)?
            .and_then(|raw| match CurrencyCode::parse(&raw) {
                Ok(code) => Some(code),
                Err(e) => {
                    warn!(error = %e, "Ignoring invalid stored currency");
                    None
                }
            }))
    }

    /// The shopper's currency, or the default when none is saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn saved_user_currency(&self) -> Result<CurrencyCode, StorageError> {
        Ok(self.saved_currency()?.unwrap_or(self.defaults.currency))
    }

    /// Persist the shopper's currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save_user_currency(&self, currency: CurrencyCode) -> Result<(), StorageError> {
        self.store.set(CURRENCY_KEY, currency.as_str())
    }

    // -------------------------------------------------------------------------
    // Auth token
    // -------------------------------------------------------------------------

    /// The saved bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn token(&self) -> Result<Option<SecretString>, StorageError> {
        Ok(self
            .store
            .get(TOKEN_KEY)?
            .filter(|token| !token.is_empty())
            .map(SecretString::from))
    }

    /// Persist a bearer token after sign-in.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save_token(&self, token: &SecretString) -> Result<(), StorageError> {
        self.store.set(TOKEN_KEY, token.expose_secret())
    }

    /// Forget the token on sign-out.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear_token(&self) -> Result<(), StorageError> {
        self.store.remove(TOKEN_KEY)
    }

    // -------------------------------------------------------------------------
    // Language
    // -------------------------------------------------------------------------

    /// The shopper's locale code, or the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn lang(&self) -> Result<String, StorageError> {
        Ok(self
            .store
            .get(LANG_KEY)?
            .filter(|lang| !lang.is_empty())
            .unwrap_or_else(|| self.defaults.lang.clone()))
    }

    /// Persist the shopper's locale code.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save_lang(&self, lang: &str) -> Result<(), StorageError> {
        self.store.set(LANG_KEY, lang)
    }
}
