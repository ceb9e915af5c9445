//! Weekly-report configuration.
//!
//! The recipient allow-list and the extra chat id were literals in control
//! flow in earlier revisions; they live here now so deployments inject them,
//! keeping the "fixed user ids + one extra chat id" shape.

use serde::{Deserialize, Serialize};

/// Default report target day.
fn default_target_day() -> String {
    String::from("saturday")
}

/// Public base URL the stable retrieval path is joined onto in notification
/// links (e.g. `https://origins.example.com`).
fn default_public_base_url() -> String {
    String::new()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    /// User ids eligible for report notifications. Only those with a
    /// configured chat id are actually notified.
    #[serde(default)]
    pub recipients: Vec<String>,

    /// Chat id appended to every recipient set unconditionally.
    #[serde(default)]
    pub extra_chat_id: String,

    /// Weekday the automatic trigger fires on.
    #[serde(default = "default_target_day")]
    pub target_day: String,

    /// Public base URL for notification links.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            recipients: Vec::new(),
            extra_chat_id: String::new(),
            target_day: default_target_day(),
            public_base_url: default_public_base_url(),
        }
    }
}
