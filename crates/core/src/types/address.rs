//! Address book entries.

use serde::{Deserialize, Serialize};

use super::id::AddressId;
use super::postal_code::{PostalCode, PostalCodeError};

/// A delivery address owned by the signed-in user.
///
/// `id` is absent for an address that has not been saved yet; saving such an
/// address creates it, saving one with an id updates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AddressId>,
    #[serde(default)]
    pub description: String,
    pub zip_code: String,
    pub street: String,
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

impl Address {
    /// Short label used when picking a delivery address.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} - {}, {}", self.neighborhood, self.street, self.number)
    }

    /// The address's postal code, validated.
    ///
    /// # Errors
    ///
    /// Returns an error if `zip_code` is not a valid CEP.
    pub fn postal_code(&self) -> Result<PostalCode, PostalCodeError> {
        PostalCode::parse(&self.zip_code)
    }
}
