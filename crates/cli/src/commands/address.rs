//! Address book management.

use shopfront_client::session::Shopfront;
use shopfront_core::{Address, AddressId, PostalCode};

use crate::error::CliError;
use crate::output;

pub async fn list(session: &Shopfront) -> Result<(), CliError> {
    let addresses = session.api().find_addresses().await.into_result()?;
    output::addresses(&addresses);
    Ok(())
}

/// Create an address, or replace it when `address.id` is set.
pub async fn save(session: &Shopfront, mut address: Address) -> Result<(), CliError> {
    let cep = PostalCode::parse(&address.zip_code)
        .map_err(shopfront_client::checkout::CheckoutError::from)?;
    address.zip_code = cep.formatted();

    let saved = session.api().save_address(&address).await.into_result()?;
    output::message("Address saved.");
    output::addresses(std::slice::from_ref(&saved));
    Ok(())
}

pub async fn remove(session: &Shopfront, id: AddressId) -> Result<(), CliError> {
    session.api().remove_address(id).await.into_result()?;
    output::message(&format!("Address #{id} removed."));
    Ok(())
}
