//! User accounts as seen by the admin panel.

use serde::{Deserialize, Serialize};

use super::id::UserId;
use super::status::Role;

/// A granted authority, e.g. `{"authority": "ROLE_ADMIN"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Authority {
    pub authority: String,
}

impl From<Role> for Authority {
    fn from(role: Role) -> Self {
        Self {
            authority: role.as_str().to_string(),
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub authorities: Vec<Authority>,
}

impl User {
    /// Whether the user holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.authorities.iter().any(|a| a.authority == role.as_str())
    }

    /// Roles held by the user; unknown authority strings are skipped.
    #[must_use]
    pub fn roles(&self) -> Vec<Role> {
        self.authorities
            .iter()
            .filter_map(|a| a.authority.parse().ok())
            .collect()
    }
}
