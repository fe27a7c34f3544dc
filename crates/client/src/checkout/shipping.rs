//! Shipping quotes for the cart.

use shopfront_core::{PostalCode, ShippingOption};
use tracing::{info, instrument};

use super::{CheckoutError, ShippingGateway};
use crate::api::Envelope;
use crate::cart::{CartStorage, CartStore};

/// Request shipping options for `raw_cep`.
///
/// The postal code is validated first; an invalid one costs no remote call
/// and leaves the current selection alone. A valid one supersedes the
/// selection, which is cleared before the quote is requested.
///
/// # Errors
///
/// Returns [`CheckoutError::InvalidPostalCode`] if `raw_cep` is not a CEP.
/// Remote failures are reported through the returned envelope.
#[instrument(skip(gateway, cart))]
pub async fn quote_shipping<G, S>(
    gateway: &G,
    cart: &mut CartStore<S>,
    raw_cep: &str,
) -> Result<Envelope<Vec<ShippingOption>>, CheckoutError>
where
    G: ShippingGateway,
    S: CartStorage,
{
    let cep = PostalCode::parse(raw_cep)?;

    cart.select_shipping_option(None);
    let response = gateway.calculate_shipping(&cep).await;

    if response.success {
        info!(
            cep = %cep,
            options = response.data.as_ref().map_or(0, Vec::len),
            "Shipping quoted"
        );
    }

    Ok(response)
}
