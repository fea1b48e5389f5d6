//! Product view-model conversions.
//!
//! Shapes [`RawProduct`]s into the flattened projections used by product
//! cards, the cart, and the wishlist. All functions are pure; the only
//! time dependency ("NEW" badge) comes through a [`Clock`].

use bazaar_core::ProductTag;
use chrono::Duration;
use thiserror::Error;
use tracing::warn;

use super::clock::Clock;
use super::types::{
    CartItem, Collection, CollectionView, FrontendProduct, ProductImage, RawProduct,
};

/// Image shown when a product has no images at all.
pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder.png";

/// How long a product keeps its "NEW" badge.
pub const NEW_PRODUCT_WINDOW_DAYS: i64 = 30;

/// Errors from product data that cannot be shaped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProductError {
    /// The product has no images to choose from.
    #[error("product has no images")]
    EmptyImageSet,
}

/// Pick the card image: the first image flagged `is_main`, else the first.
///
/// # Errors
///
/// Returns [`ProductError::EmptyImageSet`] if `images` is empty.
pub fn main_image(images: &[ProductImage]) -> Result<&ProductImage, ProductError> {
    images
        .iter()
        .find(|image| image.is_main)
        .or_else(|| images.first())
        .ok_or(ProductError::EmptyImageSet)
}

fn image_url(product: &RawProduct) -> String {
    main_image(&product.images).map_or_else(
        |_| PLACEHOLDER_IMAGE.to_string(),
        |image| image.url.clone(),
    )
}

/// Units on hand with negative quantities clamped to zero.
fn stock_quantity(product: &RawProduct) -> i64 {
    let qty = product.inventory.qty;
    if qty < 0 {
        warn!(product_id = %product.id, qty, "Negative inventory quantity, treating as out of stock");
    }
    qty.max(0)
}

fn is_on_sale(product: &RawProduct) -> bool {
    product.old_price.is_some_and(|price| !price.is_zero())
}

fn is_new(product: &RawProduct, clock: &impl Clock) -> bool {
    clock.now().signed_duration_since(product.created_at)
        < Duration::days(NEW_PRODUCT_WINDOW_DAYS)
}

/// Compute badges in [`ProductTag::ORDER`].
#[must_use]
pub fn product_tags(product: &RawProduct, clock: &impl Clock) -> Vec<ProductTag> {
    let in_stock = stock_quantity(product) > 0;
    ProductTag::ORDER
        .into_iter()
        .filter(|tag| match tag {
            ProductTag::OutOfStock => !in_stock,
            ProductTag::Sale => is_on_sale(product),
            ProductTag::New => is_new(product, clock),
        })
        .collect()
}

/// Shape a product for listings and product pages.
#[must_use]
pub fn transform_product(product: &RawProduct, clock: &impl Clock) -> FrontendProduct {
    FrontendProduct {
        id: product.id,
        slug: product.slug.clone(),
        name: product.description.name.clone(),
        price: product.price,
        original_price: product.old_price.filter(|p| !p.is_zero()),
        image: image_url(product),
        rating: product.rating,
        tags: product_tags(product, clock),
        stock_availability: stock_quantity(product) > 0,
        description: product.description.description.clone().unwrap_or_default(),
        short_description: product
            .description
            .short_description
            .clone()
            .unwrap_or_default(),
    }
}

/// Shape a product for the cart or wishlist.
#[must_use]
pub fn transform_product_cart_item(product: &RawProduct, clock: &impl Clock) -> CartItem {
    let view = transform_product(product, clock);
    CartItem {
        id: view.id,
        slug: view.slug,
        name: view.name,
        price: view.price,
        original_price: view.original_price,
        image: view.image,
        rating: view.rating,
        tags: view.tags,
        stock_availability: view.stock_availability,
        description: view.description,
        short_description: view.short_description,
        attributes: product.attributes.clone(),
        quantity: 1,
    }
}

/// Shape a collection and its product cards.
#[must_use]
pub fn collection_view(collection: &Collection, clock: &impl Clock) -> CollectionView {
    CollectionView {
        id: collection.id,
        name: collection.name.clone(),
        kind: collection.kind,
        image: collection.image.clone(),
        products: collection
            .products
            .iter()
            .map(|product| transform_product(product, clock))
            .collect(),
    }
}
