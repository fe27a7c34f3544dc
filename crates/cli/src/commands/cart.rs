//! Cart editing.
//!
//! The cart lives in the data directory, so it survives between runs.

use shopfront_client::session::Shopfront;
use shopfront_core::ProductId;

use crate::error::CliError;
use crate::output;

pub fn show(session: &Shopfront) {
    output::cart(session.cart());
}

/// Add `quantity` units of a catalog product.
pub async fn add(session: &mut Shopfront, id: ProductId, quantity: u32) -> Result<(), CliError> {
    let product = session.api().find_product(id).await.into_result()?;

    session.cart_mut().add_units(&product, quantity);

    tracing::info!(product_id = %id, quantity, "Added to cart");
    output::cart(session.cart());
    Ok(())
}

pub fn remove(session: &mut Shopfront, id: ProductId) -> Result<(), CliError> {
    ensure_in_cart(session, id)?;
    session.cart_mut().remove_from_cart(id);
    output::cart(session.cart());
    Ok(())
}

/// Set a line's quantity; zero or below removes it.
pub fn set(session: &mut Shopfront, id: ProductId, quantity: i64) -> Result<(), CliError> {
    ensure_in_cart(session, id)?;
    session.cart_mut().update_quantity(id, quantity);
    output::cart(session.cart());
    Ok(())
}

pub fn clear(session: &mut Shopfront) {
    session.cart_mut().clear_cart();
    output::message("Cart cleared.");
}

fn ensure_in_cart(session: &Shopfront, id: ProductId) -> Result<(), CliError> {
    if session.cart().items().iter().any(|item| item.product_id() == id) {
        Ok(())
    } else {
        Err(CliError::Invalid(format!("Product #{id} is not in the cart.")))
    }
}
