//! Order resource: creation, history, and state transitions.

use reqwest::Method;
use serde::Serialize;
use shopfront_core::{AddressId, CartItem, Order, OrderId, OrderStatus, Price, ProductId};
use tracing::instrument;

use super::{ApiClient, Envelope};

const ORDERS_PATH: &str = "orders";

/// One line of an order creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub price: Price,
    pub quantity: u32,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id(),
            price: item.unit_price(),
            quantity: item.quantity,
        }
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_id: Option<AddressId>,
}

impl CreateOrderRequest {
    /// Build a request from cart lines, optionally naming a delivery address.
    #[must_use]
    pub fn from_cart(items: &[CartItem], address_id: Option<AddressId>) -> Self {
        Self {
            items: items.iter().map(OrderLine::from).collect(),
            address_id,
        }
    }
}

impl ApiClient {
    /// Create an order from cart lines.
    ///
    /// Not idempotent: calling this twice creates two orders.
    #[instrument(skip(self, request), fields(lines = request.items.len()))]
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Envelope<Order> {
        let result = self
            .send_with_body::<_, Order>(Method::POST, ORDERS_PATH, request)
            .await;

        if let Ok((_, order)) = &result {
            tracing::info!(order_id = %order.id, "Order created");
        }

        Envelope::from_result_with_server_message(
            result,
            "Order created.",
            "Could not create the order.",
        )
    }

    /// Orders placed by the signed-in user.
    #[instrument(skip(self))]
    pub async fn find_my_orders(&self) -> Envelope<Vec<Order>> {
        Envelope::from_result_with_server_message(
            self.get_json(&format!("{ORDERS_PATH}/my-orders")).await,
            "Order history loaded.",
            "Could not load the order history.",
        )
    }

    /// Every order in the store (admin).
    #[instrument(skip(self))]
    pub async fn find_all_orders(&self) -> Envelope<Vec<Order>> {
        Envelope::from_result(
            self.get_json(ORDERS_PATH).await,
            "Orders loaded.",
            "Could not load orders.",
        )
    }

    /// Get a single order.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn find_order(&self, id: OrderId) -> Envelope<Order> {
        Envelope::from_result(
            self.get_json(&format!("{ORDERS_PATH}/{id}")).await,
            "Order loaded.",
            "Could not load the order.",
        )
    }

    /// Request a status transition.
    ///
    /// The body is the bare JSON string literal of the status (`"PAGO"`).
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Envelope<Order> {
        Envelope::from_result(
            self.send_with_body(Method::PUT, &format!("{ORDERS_PATH}/{id}/status"), status.as_str())
                .await,
            "Order status updated.",
            "Could not update the order status.",
        )
    }

    /// Attach a delivery address to an order.
    #[instrument(skip(self), fields(order_id = %id, address_id = %address_id))]
    pub async fn update_order_address(&self, id: OrderId, address_id: AddressId) -> Envelope<Order> {
        Envelope::from_result(
            self.send_without_body(Method::PUT, &format!("{ORDERS_PATH}/{id}/address/{address_id}"))
                .await,
            "Order address updated.",
            "Could not update the order address.",
        )
    }
}
