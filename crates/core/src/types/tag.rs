//! Badges shown on product cards.

use serde::{Deserialize, Serialize};

/// A derived product badge.
///
/// Tags are never stored on the server; they are computed from stock,
/// pricing, and creation date whenever a product is shaped for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductTag {
    /// Inventory quantity is zero (or below).
    #[serde(rename = "OUT OF STOCK")]
    OutOfStock,
    /// The product has a previous price it is discounted from.
    #[serde(rename = "SALE")]
    Sale,
    /// Created within the last 30 days.
    #[serde(rename = "NEW")]
    New,
}

impl ProductTag {
    /// The order tags are always emitted in.
    pub const ORDER: [Self; 3] = [Self::OutOfStock, Self::Sale, Self::New];

    /// Display label, identical to the serialized form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OutOfStock => "OUT OF STOCK",
            Self::Sale => "SALE",
            Self::New => "NEW",
        }
    }
}

impl std::fmt::Display for ProductTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_labels_match_display() {
        for tag in ProductTag::ORDER {
            let json = serde_json::to_string(&tag).unwrap();
            assert_eq!(json, format!("\"{tag}\""));
        }
    }
}
