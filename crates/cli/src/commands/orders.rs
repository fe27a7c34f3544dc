//! Order history.

use shopfront_client::checkout::CheckoutProgress;
use shopfront_client::error::set_sentry_user;
use shopfront_client::session::Shopfront;
use shopfront_core::{AddressId, Order, OrderId, OrderOwner};

use super::pick_address;
use crate::error::CliError;
use crate::output;

pub async fn list(session: &Shopfront) -> Result<(), CliError> {
    let orders = session.api().find_my_orders().await.into_result()?;
    if let Some(owner) = signed_in_user(&orders) {
        set_sentry_user(&owner.id(), owner.username());
    }
    output::orders(&orders);
    Ok(())
}

/// The token's owner, as seen on their own orders.
fn signed_in_user(orders: &[Order]) -> Option<&OrderOwner> {
    orders.iter().find_map(|order| order.user.as_ref())
}

pub async fn show(session: &Shopfront, id: OrderId) -> Result<(), CliError> {
    let order = session.api().find_order(id).await.into_result()?;
    output::order(&order);
    Ok(())
}

/// Complete a draft order left unfinished by an earlier checkout.
pub async fn finish(
    session: &mut Shopfront,
    id: OrderId,
    address: Option<AddressId>,
) -> Result<(), CliError> {
    let flow = session.checkout_flow();
    let context = flow.prepare(id).await?;

    let mut progress = CheckoutProgress::for_pending_order(context.order)
        .ok_or_else(|| CliError::Invalid(format!("Order #{id} is not pending.")))?;
    let address_id = pick_address(&context.addresses, address)?;

    let order = flow
        .resume(session.cart_mut(), &mut progress, address_id)
        .await?;

    output::message("Order finished.");
    output::order(&order);
    Ok(())
}
