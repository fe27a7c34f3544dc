//! A client and a persisted cart, wired from configuration.

use tracing::info;

use crate::api::ApiClient;
use crate::cart::{CartStore, FileStorage};
use crate::checkout::CheckoutFlow;
use crate::config::ClientConfig;
use crate::error::Result;

/// The storefront as seen by one user: backend access plus the local cart.
#[derive(Debug)]
pub struct Shopfront {
    api: ApiClient,
    cart: CartStore<FileStorage>,
}

impl Shopfront {
    /// Build from the environment (and `.env`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is missing or invalid, or the data
    /// directory cannot be created.
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env()?;
        Self::from_config(&config)
    }

    /// Build from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the data
    /// directory cannot be created.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let api = ApiClient::new(&config.api)?;
        let storage = FileStorage::create(&config.data_dir)?;
        let cart = CartStore::open(storage);

        info!(
            api = %api.base_url(),
            data_dir = %config.data_dir.display(),
            cart_lines = cart.items().len(),
            "Shopfront session ready"
        );

        Ok(Self { api, cart })
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore<FileStorage> {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartStore<FileStorage> {
        &mut self.cart
    }

    /// A checkout flow over this session's client.
    #[must_use]
    pub fn checkout_flow(&self) -> CheckoutFlow<ApiClient> {
        CheckoutFlow::new(self.api.clone())
    }

    /// Borrow the client and the cart at once, e.g. to run a checkout.
    pub const fn parts_mut(&mut self) -> (&ApiClient, &mut CartStore<FileStorage>) {
        (&self.api, &mut self.cart)
    }
}
