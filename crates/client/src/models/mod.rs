//! Wire types for the shop API.
//!
//! These mirror the backend's JSON shapes (camelCase fields) and use the
//! typed IDs and money types from `jacaranda-core`.

pub mod cart;
pub mod category;
pub mod dashboard;
pub mod order;
pub mod product;
pub mod user;
pub mod variant;

pub use cart::CartLine;
pub use category::{Category, CategoryInput};
pub use dashboard::{CategoryShare, DashboardStats, LowStockVariant, MonthlySales, TopProduct};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem};
pub use product::{CreateProduct, Product, ProductDetail, UpdateProduct};
pub use user::{Credentials, NewUser, RegisterReply, ShippingAddress, User};
pub use variant::{CreateVariant, Variant};
