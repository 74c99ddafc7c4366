use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ChatReply, TicketRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "You"),
            Self::Bot => write!(f, "Bot"),
        }
    }
}

/// Body of a message entry: plain text or a ticket list, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Tickets(Vec<TicketRecord>),
}

impl From<ChatReply> for Content {
    fn from(reply: ChatReply) -> Self {
        match reply {
            ChatReply::Text(text) => Self::Text(text),
            ChatReply::Tickets(records) => Self::Tickets(records),
            ChatReply::Other(value) => Self::Text(value.to_string()),
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum Delivery {
    Pending,
    Delivered,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntry {
    pub id: Uuid,
    pub role: Role,
    pub content: Content,
    pub sent_at: DateTime<Utc>,
    pub delivery: Delivery,
}

impl MessageEntry {
    /// A user-authored entry, pending until the service answers.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: Content::Text(text.into()),
            sent_at: Utc::now(),
            delivery: Delivery::Pending,
        }
    }

    pub fn bot(content: impl Into<Content>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Bot,
            content: content.into(),
            sent_at: Utc::now(),
            delivery: Delivery::Delivered,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.delivery == Delivery::Pending
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.delivery, Delivery::Failed(_))
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Content::Text(text) => Some(text),
            Content::Tickets(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_entry_starts_pending() {
        let entry = MessageEntry::user("how many tickets?");
        assert_eq!(entry.role, Role::User);
        assert!(entry.is_pending());
        assert_eq!(entry.text(), Some("how many tickets?"));
    }

    #[test]
    fn test_bot_entry_is_delivered() {
        let entry = MessageEntry::bot("Total tickets: 4");
        assert_eq!(entry.role, Role::Bot);
        assert_eq!(entry.delivery, Delivery::Delivered);
    }

    #[test]
    fn test_raw_reply_becomes_json_text() {
        let content = Content::from(ChatReply::Other(json!({"Acme": 2})));
        assert_eq!(content, Content::Text(r#"{"Acme":2}"#.to_string()));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::Bot).unwrap(), json!("bot"));
        assert_eq!(serde_json::to_value(Role::User).unwrap(), json!("user"));
    }

    #[test]
    fn test_failed_delivery_serializes_reason() {
        let value = serde_json::to_value(Delivery::Failed("timeout".into())).unwrap();
        assert_eq!(value, json!({"state": "failed", "reason": "timeout"}));
    }
}
