//! Checkout from the local cart.

use shopfront_client::checkout::CheckoutError;
use shopfront_client::session::Shopfront;
use shopfront_core::{AddressId, OrderStatus, ShippingOptionId};

use super::{pick_address, shipping};
use crate::error::CliError;
use crate::output;

/// Shipping to quote and select before placing the order.
pub struct ShippingChoice {
    pub cep: String,
    pub option: ShippingOptionId,
}

pub async fn run(
    session: &mut Shopfront,
    address: Option<AddressId>,
    shipping_choice: Option<ShippingChoice>,
    final_status: Option<OrderStatus>,
) -> Result<(), CliError> {
    if session.cart().is_empty() {
        return Err(CheckoutError::EmptyCart.into());
    }

    let addresses = session.api().find_addresses().await.into_result()?;
    let address_id = pick_address(&addresses, address)?;

    if let Some(choice) = shipping_choice {
        shipping::quote(session, &choice.cep, Some(choice.option)).await?;
    }

    let mut flow = session.checkout_flow();
    if let Some(status) = final_status {
        flow = flow.with_final_status(status);
    }

    match flow.checkout(session.cart_mut(), &addresses, address_id).await {
        Ok(order) => {
            output::message("Order placed.");
            output::order(&order);
            Ok(())
        }
        Err(err) => {
            if let Some(order_id) = err.order_id() {
                output::message(&format!(
                    "Order #{order_id} exists but is not finished. Your cart was kept. \
                     Retry with `shop orders finish {order_id} --address {address_id}`."
                ));
            }
            Err(err.into())
        }
    }
}
