//! Notification error types.

use thiserror::Error;

/// Errors from the messaging-bot API.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The bot token is missing from configuration.
    #[error("bot is not configured (set bot.token)")]
    NotConfigured,

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Bot API returned an error response.
    #[error("bot API error ({code}): {description}")]
    Api {
        /// Error code from the API response.
        code: u16,
        /// Human-readable description from the API response.
        description: String,
    },
}
