//! Checkout and order history.

use tracing::info;

use crate::cart::CartStore;
use crate::error::Result;
use crate::http::ApiClient;
use crate::models::{NewOrder, NewOrderItem, Order, ShippingAddress};

/// Typed wrappers over the order endpoints.
#[derive(Clone)]
pub struct OrdersApi {
    api: ApiClient,
}

impl OrdersApi {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Place an order for the current contents of `cart`.
    ///
    /// The order lines are the cart's lines (product, variant, quantity);
    /// pricing is authoritative on the backend. On success the cart is
    /// cleared, mirroring the post-checkout state.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::ApiError`]; the backend rejects an empty or
    /// unauthenticated order.
    pub async fn place_order(
        &self,
        cart: &CartStore,
        shipping_address: ShippingAddress,
        payment_method: impl Into<String> + Send,
    ) -> Result<Order> {
        let items = cart
            .lines()
            .into_iter()
            .map(|line| NewOrderItem {
                product_id: line.product_id,
                variant_id: line.variant_id,
                quantity: line.quantity,
            })
            .collect();

        let body = NewOrder {
            items,
            shipping_address,
            payment_method: payment_method.into(),
        };
        let order: Order = self.api.post("/orders", &body).await?;

        info!(order = %order.id, "order placed");
        cart.clear();
        Ok(order)
    }

    /// The authenticated user's past orders.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::ApiError`] from the request.
    pub async fn history(&self) -> Result<Vec<Order>> {
        self.api.get("/orders").await
    }
}
