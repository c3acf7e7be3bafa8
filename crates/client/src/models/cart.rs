//! Cart line types.

use serde::{Deserialize, Serialize};

use jacaranda_core::{Price, ProductId, VariantId};

use super::product::Product;
use super::variant::Variant;

/// One line of the shopping cart, keyed by variant identity.
///
/// Carries the display metadata and both pricing tiers *at the time of
/// add*, so the cart renders and reprices without refetching the catalog
/// and a later catalog price change does not silently reprice items
/// already in the cart. This is also the persisted shape under
/// `cart:<userId>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    /// Product name.
    pub name: String,
    /// Product slug, for linking back to the detail page.
    pub slug: String,
    pub color: String,
    pub size: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Unit price currently charged; the active tier, kept in sync by the
    /// cart store as the item count crosses the wholesale threshold.
    pub price: Price,
    /// Regular unit price at time of add (base price plus variant
    /// surcharge).
    pub retail_price: Price,
    /// Discounted unit price at time of add, when the product has one.
    #[serde(default)]
    pub wholesale_price: Option<Price>,
    pub quantity: u32,
}

impl CartLine {
    /// Build a cart line from catalog data.
    #[must_use]
    pub fn from_catalog(product: &Product, variant: &Variant, quantity: u32) -> Self {
        let image_url = variant
            .image_urls
            .first()
            .or_else(|| product.main_image_url.first())
            .cloned();

        let retail_price = product.price + variant.additional_price;
        Self {
            product_id: product.id.clone(),
            variant_id: variant.id.clone(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            color: variant.color.clone(),
            size: variant.size.clone(),
            image_url,
            price: retail_price,
            retail_price,
            wholesale_price: product
                .wholesale
                .map(|wholesale| wholesale + variant.additional_price),
            quantity,
        }
    }

    /// Line subtotal: unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// Switch the charged price to the given tier.
    ///
    /// Lines without a wholesale price always charge retail.
    pub(crate) fn reprice(&mut self, wholesale: bool) {
        self.price = if wholesale {
            self.wholesale_price.unwrap_or(self.retail_price)
        } else {
            self.retail_price
        };
    }
}
