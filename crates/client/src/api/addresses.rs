//! Address book CRUD.

use reqwest::Method;
use shopfront_core::{Address, AddressId};
use tracing::instrument;

use super::{ApiClient, Envelope};

const ADDRESS_PATH: &str = "address";

impl ApiClient {
    /// Create or update an address.
    ///
    /// An address without an id is created (`POST /address`); one with an id
    /// replaces the stored copy (`PUT /address/{id}`).
    #[instrument(skip(self, address), fields(address_id = ?address.id))]
    pub async fn save_address(&self, address: &Address) -> Envelope<Address> {
        let result = match address.id {
            Some(id) => {
                self.send_with_body(Method::PUT, &format!("{ADDRESS_PATH}/{id}"), address)
                    .await
            }
            None => self.send_with_body(Method::POST, ADDRESS_PATH, address).await,
        };

        Envelope::from_result(result, "Address saved.", "Could not save the address.")
    }

    /// Every address of the signed-in user.
    #[instrument(skip(self))]
    pub async fn find_addresses(&self) -> Envelope<Vec<Address>> {
        Envelope::from_result(
            self.get_json(ADDRESS_PATH).await,
            "Addresses loaded.",
            "Could not load addresses.",
        )
    }

    /// Get a single address.
    #[instrument(skip(self), fields(address_id = %id))]
    pub async fn find_address(&self, id: AddressId) -> Envelope<Address> {
        Envelope::from_result(
            self.get_json(&format!("{ADDRESS_PATH}/{id}")).await,
            "Address loaded.",
            "Could not load the address.",
        )
    }

    /// Delete an address.
    #[instrument(skip(self), fields(address_id = %id))]
    pub async fn remove_address(&self, id: AddressId) -> Envelope<()> {
        let result = match self.request(Method::DELETE, &format!("{ADDRESS_PATH}/{id}")) {
            Ok(request) => self.send_empty(request).await,
            Err(err) => Err(err),
        };

        Envelope::from_result(result, "Address removed.", "Could not remove the address.")
    }
}
