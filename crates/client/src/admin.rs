//! Admin surface: catalog CRUD and the sales dashboard.
//!
//! Every call here requires an admin session; the backend enforces it and a
//! non-admin caller sees an ordinary HTTP 403.

use reqwest::Method;

use jacaranda_core::{CategoryId, ProductId, VariantId};

use crate::error::Result;
use crate::http::{ApiClient, FormPart, Payload};
use crate::models::{
    Category, CategoryInput, CreateProduct, CreateVariant, DashboardStats, Product, UpdateProduct,
    Variant,
};

/// An image file staged for upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Original file name, kept for the multipart part.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Typed wrappers over the admin endpoints.
#[derive(Clone)]
pub struct AdminApi {
    api: ApiClient,
}

impl AdminApi {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Products
    // ─────────────────────────────────────────────────────────────────────

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::ApiError`] from the request.
    pub async fn create_product(&self, product: &CreateProduct) -> Result<Product> {
        self.api.post("/products", product).await
    }

    /// Apply a partial update to a product.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::ApiError`] from the request.
    pub async fn update_product(&self, id: &ProductId, patch: &UpdateProduct) -> Result<Product> {
        self.api.patch(&format!("/products/{id}"), patch).await
    }

    /// Delete a product and its variants.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::ApiError`] from the request.
    pub async fn delete_product(&self, id: &ProductId) -> Result<()> {
        self.api.delete(&format!("/products/{id}")).await
    }

    /// Upload product images as a multipart form.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::ApiError`] from the request.
    pub async fn upload_product_images(
        &self,
        id: &ProductId,
        images: Vec<ImageUpload>,
    ) -> Result<Product> {
        let parts = images
            .into_iter()
            .map(|image| FormPart::file("images", image.file_name, image.bytes))
            .collect();
        self.api
            .request(
                Method::POST,
                &format!("/products/{id}/images"),
                Payload::Multipart(parts),
            )
            .await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Categories
    // ─────────────────────────────────────────────────────────────────────

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::ApiError`] from the request.
    pub async fn create_category(&self, category: &CategoryInput) -> Result<Category> {
        self.api.post("/categories", category).await
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::ApiError`] from the request.
    pub async fn update_category(
        &self,
        id: &CategoryId,
        category: &CategoryInput,
    ) -> Result<Category> {
        self.api.patch(&format!("/categories/{id}"), category).await
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::ApiError`] from the request.
    pub async fn delete_category(&self, id: &CategoryId) -> Result<()> {
        self.api.delete(&format!("/categories/{id}")).await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Variants
    // ─────────────────────────────────────────────────────────────────────

    /// Create a variant for a product.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::ApiError`] from the request.
    pub async fn create_variant(&self, variant: &CreateVariant) -> Result<Variant> {
        self.api.post("/variants", variant).await
    }

    /// Delete a variant.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::ApiError`] from the request.
    pub async fn delete_variant(&self, id: &VariantId) -> Result<()> {
        self.api.delete(&format!("/variants/{id}")).await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Dashboard
    // ─────────────────────────────────────────────────────────────────────

    /// Fetch the sales dashboard aggregates.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::ApiError`] from the request.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.api.get("/dashboard/stats").await
    }
}
