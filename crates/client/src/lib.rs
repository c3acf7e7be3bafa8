//! Jacarandá Client - storefront and admin SDK for the shop's REST API.
//!
//! The SDK has two load-bearing pieces and a set of thin typed surfaces on
//! top of them:
//!
//! - [`ApiClient`] - authenticated HTTP with transparent credential
//!   renewal: a 401 triggers exactly one refresh call no matter how many
//!   requests observe it concurrently, and every blocked request replays
//!   once with the renewed credential. A failed renewal rejects the whole
//!   batch with [`ApiError::SessionExpired`] and broadcasts a global
//!   unauthorized signal.
//! - [`CartStore`] - the per-user shopping cart, mirrored to durable
//!   storage under `cart:<userId>` on every mutation and swapped wholesale
//!   whenever the active identity changes.
//!
//! [`Session`] owns the identity and consumes the unauthorized signal;
//! [`CatalogApi`], [`OrdersApi`], and [`AdminApi`] are typed endpoint
//! wrappers. [`Shop`] wires all of it together from configuration.
//!
//! # Example
//!
//! ```rust,ignore
//! use jacaranda_client::{CartLine, Credentials, Shop};
//! use jacaranda_core::Email;
//!
//! let shop = Shop::from_env()?;
//! shop.session.restore();
//!
//! let user = shop
//!     .session
//!     .login(Credentials::new(Email::parse("ana@example.com")?, "secret"))
//!     .await?;
//!
//! let detail = shop.catalog.product_by_slug("linen-shirt").await?;
//! if let Some(variant) = detail.variants.first() {
//!     shop.cart.add_line(CartLine::from_catalog(&detail.product, variant, 1));
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod orders;
pub mod session;
pub mod storage;

pub use admin::{AdminApi, ImageUpload};
pub use cart::CartStore;
pub use catalog::CatalogApi;
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use http::{ApiClient, FormPart, Payload, Unauthorized};
pub use models::{CartLine, Credentials};
pub use orders::OrdersApi;
pub use session::Session;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};

use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur while wiring up a [`Shop`].
#[derive(Debug, Error)]
pub enum ShopError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Everything a storefront (or admin console) needs, wired together.
///
/// Explicit construction instead of ambient globals: pass the `Shop` (or
/// the individual components) by reference to whatever needs them.
#[derive(Clone)]
pub struct Shop {
    pub api: ApiClient,
    pub session: Session,
    pub cart: CartStore,
    pub catalog: CatalogApi,
    pub orders: OrdersApi,
    pub admin: AdminApi,
}

impl Shop {
    /// Wire up a shop from configuration, with file-backed storage in the
    /// configured state directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the state directory or HTTP client cannot be
    /// created.
    pub fn new(config: &ClientConfig) -> Result<Self, ShopError> {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(config.storage_dir.clone())?);
        Ok(Self::with_storage(config, storage)?)
    }

    /// Wire up a shop with a caller-provided storage backend.
    ///
    /// When called inside a tokio runtime this also spawns the session's
    /// unauthorized watcher, so a failed credential renewal tears the
    /// session down without further wiring. The broadcast does not buffer
    /// for late subscribers; callers constructing a `Shop` outside a
    /// runtime must spawn [`Session::watch_unauthorized`] themselves once
    /// one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_storage(config: &ClientConfig, storage: Arc<dyn Storage>) -> Result<Self, ApiError> {
        let api = ApiClient::new(config)?;
        let cart = CartStore::new(Arc::clone(&storage));
        let session = Session::new(api.clone(), cart.clone(), storage);

        if tokio::runtime::Handle::try_current().is_ok() {
            let _watcher = session.watch_unauthorized();
        }

        Ok(Self {
            catalog: CatalogApi::new(api.clone()),
            orders: OrdersApi::new(api.clone()),
            admin: AdminApi::new(api.clone()),
            session,
            cart,
            api,
        })
    }

    /// Wire up a shop from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or wiring fails.
    pub fn from_env() -> Result<Self, ShopError> {
        let config = ClientConfig::from_env()?;
        Self::new(&config)
    }
}
