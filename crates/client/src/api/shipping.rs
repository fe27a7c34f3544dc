//! Shipping quotes.

use reqwest::Method;
use shopfront_core::{PostalCode, ShippingOption};
use tracing::instrument;

use super::{ApiClient, ApiError, Envelope};

const SHIPPING_PATH: &str = "api/shipping/calculate";

impl ApiClient {
    /// Shipping options available for a postal code.
    #[instrument(skip(self), fields(cep = %cep))]
    pub async fn calculate_shipping(&self, cep: &PostalCode) -> Envelope<Vec<ShippingOption>> {
        Envelope::from_result(
            self.fetch_shipping(cep).await,
            "Shipping calculated.",
            "Could not calculate shipping. Check the postal code.",
        )
    }

    async fn fetch_shipping(&self, cep: &PostalCode) -> Result<(u16, Vec<ShippingOption>), ApiError> {
        let mut url = self.url(SHIPPING_PATH)?;
        url.query_pairs_mut().append_pair("cep", cep.as_str());

        let request = self.inner.client.request(Method::GET, url);
        self.send_json(request).await
    }
}
