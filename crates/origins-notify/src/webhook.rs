//! Incoming webhook update types.
//!
//! Only the fields the chat-linking flow reads are modeled; everything else
//! in the update payload is ignored.

use serde::Deserialize;

/// One webhook update from the bot API.
#[derive(Debug, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

impl Update {
    /// The user id carried by a `/start <user-id>` command, if this update
    /// is one.
    #[must_use]
    pub fn start_payload(&self) -> Option<&str> {
        let text = self.message.as_ref()?.text.as_deref()?;
        parse_start_command(text)
    }

    /// Chat id of the sending chat, if the update carries a message.
    #[must_use]
    pub fn chat_id(&self) -> Option<i64> {
        self.message.as_ref().map(|m| m.chat.id)
    }
}

/// Extract the payload of a `/start <payload>` command. Returns `None` for
/// any other text, including a bare `/start`.
#[must_use]
pub fn parse_start_command(text: &str) -> Option<&str> {
    let rest = text.trim().strip_prefix("/start")?;
    let payload = rest.trim();
    if payload.is_empty() || !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"{
        "update_id": 721000001,
        "message": {
            "message_id": 55,
            "chat": {"id": 987654321, "type": "private"},
            "date": 1756300000,
            "text": "/start usr-1a2b3c4d"
        }
    }"#;

    #[test]
    fn parse_start_update() {
        let update: Update = serde_json::from_str(FIXTURE).unwrap();
        assert_eq!(update.chat_id(), Some(987_654_321));
        assert_eq!(update.start_payload(), Some("usr-1a2b3c4d"));
    }

    #[test]
    fn non_command_text_has_no_payload() {
        let update: Update = serde_json::from_str(
            r#"{"message": {"chat": {"id": 1}, "text": "hello there"}}"#,
        )
        .unwrap();
        assert_eq!(update.start_payload(), None);
        assert_eq!(update.chat_id(), Some(1));
    }

    #[test]
    fn update_without_message_is_tolerated() {
        let update: Update = serde_json::from_str(r#"{"update_id": 1}"#).unwrap();
        assert_eq!(update.start_payload(), None);
        assert_eq!(update.chat_id(), None);
    }

    #[test]
    fn start_command_parsing() {
        assert_eq!(parse_start_command("/start usr-abc"), Some("usr-abc"));
        assert_eq!(parse_start_command("  /start   usr-abc  "), Some("usr-abc"));
        assert_eq!(parse_start_command("/start"), None);
        assert_eq!(parse_start_command("/started usr-abc"), None);
        assert_eq!(parse_start_command("/stop usr-abc"), None);
    }
}
