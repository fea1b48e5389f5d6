//! Cache types for storefront API responses.

use std::sync::Arc;

use bazaar_core::VariantGroupId;

use crate::catalog::{Category, Collection, VariantGroup};
use crate::settings::Settings;

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Collections,
    Categories,
    Settings,
    VariantGroup(VariantGroupId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Collections(Arc<Vec<Collection>>),
    Categories(Arc<Vec<Category>>),
    Settings(Arc<Settings>),
    VariantGroup(Arc<VariantGroup>),
}
