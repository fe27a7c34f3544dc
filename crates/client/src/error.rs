//! Client-level errors and Sentry helpers.
//!
//! Remote failures never surface as errors: the data-access layer folds them
//! into an [`Envelope`](crate::api::Envelope). The errors here cover building
//! the client itself. Breadcrumb helpers record the trail of cart and checkout
//! actions that Sentry attaches to any captured event.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::StorageError;
use crate::config::ConfigError;

/// Errors that can occur while assembling a [`Shopfront`](crate::session::Shopfront).
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("API client error: {0}")]
    Api(#[from] ApiError),

    /// The local storage directory is unusable.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Set the Sentry user context from a user ID.
///
/// Call this once the signed-in user is known to associate events with them.
pub fn set_sentry_user(user_id: &impl ToString, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: username.map(String::from),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("product_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_display() {
        let err = ClientError::Config(ConfigError::MissingEnvVar("SHOPFRONT_API_URL".to_string()));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing environment variable: SHOPFRONT_API_URL"
        );
    }

    #[test]
    fn test_breadcrumb_without_client_is_noop() {
        // No Sentry client is bound in tests; recording must not panic.
        add_breadcrumb("cart", "Cleared cart", Some(&[("lines", "3")]));
        set_sentry_user(&7, Some("ana"));
    }
}
