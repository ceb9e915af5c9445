//! # origins-notify
//!
//! Messaging-bot HTTP client for Origins.
//!
//! Sends report notifications to chats over the Telegram Bot API and parses
//! the incoming webhook updates the chat-linking flow relies on. The API
//! base URL is configurable so tests and self-hosted gateways can point the
//! client elsewhere.

mod error;
pub mod webhook;

pub use error::NotifyError;

use serde::{Deserialize, Serialize};

use origins_config::BotConfig;

/// Text formatting mode for outgoing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Markdown,
    Html,
}

impl ParseMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
            Self::Html => "HTML",
        }
    }
}

/// An inline URL button attached below a message.
#[derive(Debug, Clone)]
pub struct LinkButton {
    pub text: String,
    pub url: String,
}

/// Optional send parameters. `Default` sends plain text with link previews
/// enabled and no button.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    pub parse_mode: Option<ParseMode>,
    pub disable_link_preview: bool,
    pub button: Option<LinkButton>,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    disable_web_page_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<ReplyMarkup<'a>>,
}

#[derive(Serialize)]
struct ReplyMarkup<'a> {
    inline_keyboard: Vec<Vec<InlineButton<'a>>>,
}

#[derive(Serialize)]
struct InlineButton<'a> {
    text: &'a str,
    url: &'a str,
}

/// Bot API response envelope. Failed calls still return HTTP 200 with
/// `ok: false` and an error payload.
#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error_code: Option<u16>,
    #[serde(default)]
    description: Option<String>,
}

/// HTTP client for the bot API.
#[derive(Debug)]
pub struct BotClient {
    http: reqwest::Client,
    token: String,
    api_base: String,
}

impl BotClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::NotConfigured`] when the token is missing, or
    /// [`NotifyError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &BotConfig) -> Result<Self, NotifyError> {
        if !config.is_configured() {
            return Err(NotifyError::NotConfigured);
        }
        Ok(Self {
            http: reqwest::Client::builder()
                .user_agent("origins/0.1")
                .timeout(std::time::Duration::from_secs(10))
                .build()?,
            token: config.token.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.token)
    }

    /// Send `text` to `chat_id`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] on transport failure or
    /// [`NotifyError::Api`] when the bot API rejects the message.
    pub async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        options: &SendOptions,
    ) -> Result<(), NotifyError> {
        let body = SendMessageRequest {
            chat_id,
            text,
            parse_mode: options.parse_mode.map(ParseMode::as_str),
            disable_web_page_preview: options.disable_link_preview,
            reply_markup: options.button.as_ref().map(|b| ReplyMarkup {
                inline_keyboard: vec![vec![InlineButton {
                    text: &b.text,
                    url: &b.url,
                }]],
            }),
        };

        let resp = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let envelope: ApiResponse = resp.json().await?;
        if !envelope.ok {
            return Err(NotifyError::Api {
                code: envelope.error_code.unwrap_or(status),
                description: envelope.description.unwrap_or_default(),
            });
        }

        tracing::debug!(chat_id, "message delivered");
        Ok(())
    }
}
