//! Sales dashboard types for the admin surface.

use serde::Deserialize;

use jacaranda_core::{Price, ProductId};

/// Aggregate figures from `GET /dashboard/stats`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_products: u64,
    pub total_variants: u64,
    pub featured_products: u64,
    pub available_products: u64,
    pub total_views: u64,
    pub total_sales: u64,
    pub total_revenue: Price,
    pub average_order_value: Price,
    pub conversion_rate: f64,
    #[serde(default)]
    pub top_products: Vec<TopProduct>,
    #[serde(default)]
    pub low_stock_products: Vec<LowStockVariant>,
    #[serde(default)]
    pub sales_by_month: Vec<MonthlySales>,
    #[serde(default)]
    pub products_by_category: Vec<CategoryShare>,
}

/// A best-selling product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub id: ProductId,
    pub name: String,
    pub sales: u64,
    pub revenue: Price,
    pub views: u64,
}

/// A variant running low on inventory.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockVariant {
    pub id: ProductId,
    pub name: String,
    /// Display label of the variant (e.g. "sand / M").
    pub variant: String,
    pub stock: u32,
}

/// Sales totals for one month.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySales {
    pub month: String,
    pub sales: u64,
    pub revenue: Price,
}

/// Product count per category, with the chart color the backend assigns.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub category: String,
    pub count: u64,
    pub color: String,
}
