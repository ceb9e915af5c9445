//! Messaging-bot configuration.

use serde::{Deserialize, Serialize};

/// Default bot API base URL.
fn default_api_base() -> String {
    String::from("https://api.telegram.org")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    /// Bot API token.
    #[serde(default)]
    pub token: String,

    /// API base URL. Overridable for tests and self-hosted gateways.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: default_api_base(),
        }
    }
}

impl BotConfig {
    /// Check if the bot config has the minimum required fields.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.token.is_empty() && !self.api_base.is_empty()
    }
}
