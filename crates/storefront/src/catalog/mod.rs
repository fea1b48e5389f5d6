//! Catalog data shaping.
//!
//! Pure functions that turn raw API payloads into view-models:
//!
//! - [`categories`] - Flat category list to nested navigation views
//! - [`products`] - Raw products to card, cart, and wishlist projections
//! - [`types`] - Raw and view types
//! - [`clock`] - Injected time source for the "NEW" badge

pub mod categories;
pub mod clock;
pub mod products;
pub mod types;

pub use categories::{CategoryError, CategoryTree, organize_categories};
pub use clock::{Clock, FixedClock, SystemClock};
pub use products::{
    PLACEHOLDER_IMAGE, ProductError, collection_view, main_image, product_tags,
    transform_product, transform_product_cart_item,
};
pub use types::*;
