//! Command implementations, one module per top-level subcommand.

pub mod address;
pub mod admin;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod shipping;

use shopfront_client::checkout::CheckoutError;
use shopfront_core::{Address, AddressId};

use crate::error::CliError;

/// The address to deliver to: the one named, or the only one on file.
pub(crate) fn pick_address(
    addresses: &[Address],
    requested: Option<AddressId>,
) -> Result<AddressId, CliError> {
    match (addresses, requested) {
        ([], _) => Err(CheckoutError::NoAddress.into()),
        (_, Some(id)) if addresses.iter().any(|address| address.id == Some(id)) => Ok(id),
        (_, Some(id)) => Err(CheckoutError::UnknownAddress(id).into()),
        ([only], None) => only
            .id
            .ok_or_else(|| CliError::Invalid("The stored address has no id.".to_string())),
        (_, None) => Err(CliError::Invalid(
            "Several addresses on file; choose one with --address (see `shop address list`)."
                .to_string(),
        )),
    }
}
