//! Shipping quotes.

use shopfront_client::checkout::quote_shipping;
use shopfront_client::session::Shopfront;
use shopfront_core::{ShippingOption, ShippingOptionId};

use crate::error::CliError;
use crate::output;

/// Quote shipping for `cep` and optionally select one of the options.
///
/// Returns the selected option, if any.
pub async fn quote(
    session: &mut Shopfront,
    cep: &str,
    select: Option<ShippingOptionId>,
) -> Result<Option<ShippingOption>, CliError> {
    let (api, cart) = session.parts_mut();
    let options = quote_shipping(api, cart, cep).await?.into_result()?;
    output::shipping_options(&options);

    let Some(id) = select else {
        return Ok(None);
    };

    let option = options
        .into_iter()
        .find(|option| option.id == id)
        .ok_or_else(|| CliError::Invalid(format!("No shipping option #{id} for this postal code.")))?;

    cart.select_shipping_option(Some(option.clone()));
    output::cart(&*cart);
    Ok(Some(option))
}
