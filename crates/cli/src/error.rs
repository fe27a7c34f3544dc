//! CLI error type.

use shopfront_client::api::Envelope;
use shopfront_client::checkout::CheckoutError;
use shopfront_client::error::ClientError;
use thiserror::Error;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The session could not be set up.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Checkout stopped.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// The backend refused or could not be reached.
    #[error("{message} (HTTP {status})")]
    Remote { status: u16, message: String },

    /// The command line asked for something that cannot be done.
    #[error("{0}")]
    Invalid(String),
}

impl From<Envelope<()>> for CliError {
    fn from(failure: Envelope<()>) -> Self {
        Self::Remote {
            status: failure.status,
            message: failure.message,
        }
    }
}
