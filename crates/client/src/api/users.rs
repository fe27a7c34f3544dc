//! User administration.

use reqwest::Method;
use shopfront_core::{Authority, Role, User, UserId};
use tracing::instrument;

use super::{ApiClient, Envelope};

const USERS_PATH: &str = "users";

impl ApiClient {
    /// Every registered user (admin).
    #[instrument(skip(self))]
    pub async fn find_users(&self) -> Envelope<Vec<User>> {
        Envelope::from_result(
            self.get_json(USERS_PATH).await,
            "Users loaded.",
            "Could not load users.",
        )
    }

    /// Replace a user's granted roles (admin).
    ///
    /// The body is a list of `{"authority": ...}` objects.
    #[instrument(skip(self, roles), fields(user_id = %id, roles = roles.len()))]
    pub async fn update_authorities(&self, id: UserId, roles: &[Role]) -> Envelope<User> {
        let payload: Vec<Authority> = roles.iter().copied().map(Authority::from).collect();

        Envelope::from_result(
            self.send_with_body(Method::PUT, &format!("{USERS_PATH}/{id}/authorities"), &payload)
                .await,
            "Permissions updated.",
            "Could not update permissions.",
        )
    }
}
