//! Variant (SKU) types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jacaranda_core::{Price, ProductId, VariantId};

/// A purchasable SKU: a specific color and size of a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
    #[serde(default)]
    pub sku: String,
    pub stock: u32,
    /// Surcharge over the product's base price.
    #[serde(default)]
    pub additional_price: Price,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Variant {
    /// Whether the variant can currently be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Fields for `POST /variants`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVariant {
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub stock: u32,
    pub additional_price: Price,
    pub image_urls: Vec<String>,
}
