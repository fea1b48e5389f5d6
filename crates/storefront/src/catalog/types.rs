//! Catalog types as returned by the storefront API and as shaped for views.
//!
//! Raw types mirror the server JSON; view types are the flattened
//! projections consumed by listing, cart, and wishlist screens.

use bazaar_core::{CategoryId, CollectionId, ProductId, ProductTag, VariantGroupId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Category Types
// =============================================================================

/// Localised category text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDescription {
    /// Display name.
    pub name: String,
    /// Optional banner or icon URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A category as listed by the API, with a flat parent reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Parent category, `None` for roots.
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    /// Name and image.
    pub description: CategoryDescription,
}

impl Category {
    /// Whether this category sits at the top of the tree.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.description.name
    }
}

// =============================================================================
// Product Types
// =============================================================================

/// Localised product text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDescription {
    /// Product name.
    pub name: String,
    /// Long description (HTML from the CMS).
    #[serde(default)]
    pub description: Option<String>,
    /// One-line summary for cards.
    #[serde(default)]
    pub short_description: Option<String>,
}

/// A product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Image URL.
    pub url: String,
    /// Whether this is the image to show on cards.
    #[serde(default)]
    pub is_main: bool,
}

/// An attribute value on a product (e.g., Size = M).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductAttribute {
    /// Attribute name (e.g., "Size").
    pub name: String,
    /// Attribute value (e.g., "M").
    pub value: String,
}

/// Stock information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Inventory {
    /// Units on hand. The API has been seen to send negative values.
    pub qty: i64,
}

/// A product in the server's shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawProduct {
    /// Product ID.
    pub id: ProductId,
    /// URL slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// Name and descriptions.
    pub description: ProductDescription,
    /// All product images.
    #[serde(default)]
    pub images: Vec<ProductImage>,
    /// Attribute values (size, color, ...).
    #[serde(default)]
    pub attributes: Vec<ProductAttribute>,
    /// Stock information.
    #[serde(default)]
    pub inventory: Inventory,
    /// Current price.
    pub price: Decimal,
    /// Previous price when discounted.
    #[serde(default)]
    pub old_price: Option<Decimal>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Mean review rating computed by the server.
    #[serde(default)]
    pub rating: Option<f64>,
    /// Variant group this SKU belongs to.
    #[serde(default)]
    pub variant_group_id: Option<VariantGroupId>,
}

/// Product projection for listings and product pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontendProduct {
    pub id: ProductId,
    pub slug: Option<String>,
    pub name: String,
    pub price: Decimal,
    #[serde(rename = "originalPrice", skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    /// Single image URL for cards.
    pub image: String,
    pub rating: Option<f64>,
    pub tags: Vec<ProductTag>,
    pub stock_availability: bool,
    pub description: String,
    pub short_description: String,
}

/// Product projection stored in the cart and wishlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub slug: Option<String>,
    pub name: String,
    pub price: Decimal,
    #[serde(rename = "originalPrice", skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    pub image: String,
    pub rating: Option<f64>,
    pub tags: Vec<ProductTag>,
    pub stock_availability: bool,
    pub description: String,
    pub short_description: String,
    /// Selected attribute values of this SKU.
    #[serde(default)]
    pub attributes: Vec<ProductAttribute>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

// =============================================================================
// Collection Types
// =============================================================================

/// How a collection is merchandised on the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// Full-width banner carousel.
    Banner,
    /// Product row.
    #[default]
    Section,
}

/// A merchandising collection as returned by `/collections`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection ID.
    pub id: CollectionId,
    /// Title.
    pub name: String,
    /// Banner or section.
    #[serde(default, rename = "type")]
    pub kind: CollectionKind,
    /// Banner image, if any.
    #[serde(default)]
    pub image: Option<String>,
    /// Products in this collection.
    #[serde(default)]
    pub products: Vec<RawProduct>,
}

/// A collection with its products shaped as cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionView {
    pub id: CollectionId,
    pub name: String,
    pub kind: CollectionKind,
    pub image: Option<String>,
    pub products: Vec<FrontendProduct>,
}

// =============================================================================
// Variant Group Types
// =============================================================================

/// One SKU of a variant group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Product ID of this SKU.
    pub product_id: ProductId,
    /// Attribute combination identifying the SKU.
    #[serde(default)]
    pub attributes: Vec<ProductAttribute>,
}

/// A set of SKUs differing only by attribute combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantGroup {
    /// Group ID.
    pub id: VariantGroupId,
    /// Group name.
    #[serde(default)]
    pub name: Option<String>,
    /// SKUs in this group.
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl VariantGroup {
    /// Find the SKU whose attributes contain every `(name, value)` pair.
    ///
    /// Returns `None` when no SKU matches or `selection` is empty.
    #[must_use]
    pub fn find_variant(&self, selection: &[ProductAttribute]) -> Option<ProductId> {
        if selection.is_empty() {
            return None;
        }

        self.variants
            .iter()
            .find(|variant| selection.iter().all(|s| variant.attributes.contains(s)))
            .map(|variant| variant.product_id)
    }

    /// All distinct values offered for `attribute`, in first-seen order.
    #[must_use]
    pub fn values_for(&self, attribute: &str) -> Vec<&str> {
        let mut values: Vec<&str> = Vec::new();
        for attr in self.variants.iter().flat_map(|v| &v.attributes) {
            if attr.name == attribute && !values.contains(&attr.value.as_str()) {
                values.push(&attr.value);
            }
        }
        values
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn attr(name: &str, value: &str) -> ProductAttribute {
        ProductAttribute {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    fn shirt_group() -> VariantGroup {
        VariantGroup {
            id: VariantGroupId::new(1),
            name: Some("Shirt".to_string()),
            variants: vec![
                Variant {
                    product_id: ProductId::new(10),
                    attributes: vec![attr("Size", "S"), attr("Color", "Red")],
                },
                Variant {
                    product_id: ProductId::new(11),
                    attributes: vec![attr("Size", "M"), attr("Color", "Red")],
                },
                Variant {
                    product_id: ProductId::new(12),
                    attributes: vec![attr("Size", "M"), attr("Color", "Blue")],
                },
            ],
        }
    }

    #[test]
    fn test_find_variant_matches_full_selection() {
        let group = shirt_group();
        let found = group.find_variant(&[attr("Size", "M"), attr("Color", "Blue")]);
        assert_eq!(found, Some(ProductId::new(12)));
    }

    #[test]
    fn test_find_variant_no_match() {
        let group = shirt_group();
        assert_eq!(
            group.find_variant(&[attr("Size", "S"), attr("Color", "Blue")]),
            None
        );
        assert_eq!(group.find_variant(&[]), None);
    }

    #[test]
    fn test_values_for_dedupes_in_order() {
        let group = shirt_group();
        assert_eq!(group.values_for("Size"), vec!["S", "M"]);
        assert_eq!(group.values_for("Color"), vec!["Red", "Blue"]);
        assert!(group.values_for("Material").is_empty());
    }

    #[test]
    fn test_raw_product_accepts_string_prices() {
        let json = r#"{
            "id": 5,
            "description": {"name": "Mug"},
            "price": "12.50",
            "old_price": null,
            "created_at": "2026-01-01T00:00:00Z",
            "inventory": {"qty": 3}
        }"#;
        let product: RawProduct = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, Decimal::new(1250, 2));
        assert!(product.images.is_empty());
        assert_eq!(product.inventory.qty, 3);
    }

    #[test]
    fn test_collection_kind_from_type_field() {
        let json = r#"{"id": 1, "name": "Hero", "type": "banner"}"#;
        let collection: Collection = serde_json::from_str(json).unwrap();
        assert_eq!(collection.kind, CollectionKind::Banner);
        assert!(collection.products.is_empty());
    }
}
