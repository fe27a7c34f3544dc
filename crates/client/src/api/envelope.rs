//! Uniform response envelope returned by every data-access operation.

use serde::Serialize;

use super::ApiError;

/// Status reported when the transport supplied none.
pub const DEFAULT_ERROR_STATUS: u16 = 500;

/// Normalized outcome of a backend call: `{status, success, message, data}`.
///
/// On success `data` carries the decoded resource. On failure `data` is
/// `None` and `message` is safe to show the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope<T> {
    pub status: u16,
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// A successful outcome.
    #[must_use]
    pub fn ok(status: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            status,
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// A failed outcome.
    #[must_use]
    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            success: false,
            message: message.into(),
            data: None,
        }
    }

    /// Fold a call result into an envelope with fixed messages.
    pub(crate) fn from_result(
        result: Result<(u16, T), ApiError>,
        success_message: &str,
        failure_message: &str,
    ) -> Self {
        match result {
            Ok((status, data)) => Self::ok(status, success_message, data),
            Err(err) => {
                tracing::warn!(status = err.status(), error = %err, "{failure_message}");
                Self::failure(err.status(), failure_message)
            }
        }
    }

    /// Like [`Envelope::from_result`], but a `message` sent by the backend
    /// replaces the fixed failure message.
    pub(crate) fn from_result_with_server_message(
        result: Result<(u16, T), ApiError>,
        success_message: &str,
        failure_message: &str,
    ) -> Self {
        match result {
            Ok((status, data)) => Self::ok(status, success_message, data),
            Err(err) => {
                tracing::warn!(status = err.status(), error = %err, "{failure_message}");
                let message = err.server_message().unwrap_or(failure_message).to_string();
                Self::failure(err.status(), message)
            }
        }
    }


    /// The payload of a successful outcome, or the failure itself.
    ///
    /// # Errors
    ///
    /// Returns the envelope (without data) when `success` is false or no data
    /// was carried.
    pub fn into_result(self) -> Result<T, Envelope<()>> {
        match self.data {
            Some(data) if self.success => Ok(data),
            _ => Err(Envelope {
                status: self.status,
                success: false,
                message: self.message,
                data: None,
            }),
        }
    }
}
