//! Storefront read surface: products, variants, categories.

use jacaranda_core::ProductId;

use crate::error::Result;
use crate::http::ApiClient;
use crate::models::{Category, Product, ProductDetail, Variant};

/// Typed wrappers over the public catalog endpoints.
#[derive(Clone)]
pub struct CatalogApi {
    api: ApiClient,
}

impl CatalogApi {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// List every product in the catalog.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::ApiError`] from the request.
    pub async fn products(&self) -> Result<Vec<Product>> {
        self.api.get("/products").await
    }

    /// Fetch a product and its variants by slug.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::ApiError`]; an unknown slug surfaces as an
    /// HTTP 404.
    pub async fn product_by_slug(&self, slug: &str) -> Result<ProductDetail> {
        self.api.get(&format!("/products/{slug}")).await
    }

    /// List the variants of one product.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::ApiError`] from the request.
    pub async fn variants_for(&self, product_id: &ProductId) -> Result<Vec<Variant>> {
        self.api.get(&format!("/variants/product/{product_id}")).await
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::ApiError`] from the request.
    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.api.get("/categories").await
    }
}
