use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ChatError, ChatResult};
use crate::models::ChatReply;

pub const DEFAULT_CHAT_ENDPOINT: &str = "http://localhost:8000/chat";

/// The single outbound exchange with the chat service.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(&self, text: &str) -> ChatResult<ChatReply>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// No timeout is configured; a request waits as long as the service does.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.endpoint.clone())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_CHAT_ENDPOINT)
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send_message(&self, text: &str) -> ChatResult<ChatReply> {
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        debug!(endpoint = %self.endpoint, chars = text.chars().count(), "posting chat message");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { message: text })
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        parse_reply(&bytes)
    }
}

/// Extracts the `reply` field of a response body without validating its shape.
pub fn parse_reply(body: &[u8]) -> ChatResult<ChatReply> {
    let mut body: Value = serde_json::from_slice(body)?;
    match body.get_mut("reply") {
        Some(reply) => Ok(ChatReply::from(reply.take())),
        None => Err(ChatError::MissingReply),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TicketRecord;

    #[test]
    fn test_parse_text_reply() {
        let reply = parse_reply(br#"{"reply": "hello"}"#).unwrap();
        assert_eq!(reply, ChatReply::Text("hello".to_string()));
    }

    #[test]
    fn test_parse_ticket_reply() {
        let body = br#"{"reply": [{"ticket_id": "T1", "company": "Acme", "status": "open", "created_date": "2024-01-01"}]}"#;
        let reply = parse_reply(body).unwrap();
        assert_eq!(
            reply,
            ChatReply::Tickets(vec![TicketRecord::new("T1", "Acme", "open", "2024-01-01")])
        );
    }

    #[test]
    fn test_parse_missing_reply() {
        assert!(matches!(
            parse_reply(br#"{"answer": "hi"}"#),
            Err(ChatError::MissingReply)
        ));
        assert!(matches!(parse_reply(br#"[1, 2]"#), Err(ChatError::MissingReply)));
    }

    #[test]
    fn test_parse_malformed_json() {
        assert!(matches!(parse_reply(b"<html>"), Err(ChatError::Decode(_))));
    }

    #[test]
    fn test_default_endpoint() {
        assert_eq!(HttpTransport::default().endpoint(), DEFAULT_CHAT_ENDPOINT);
    }

    #[tokio::test]
    async fn test_empty_message_never_leaves_the_process() {
        let transport = HttpTransport::new("http://127.0.0.1:9/chat");
        assert!(matches!(
            transport.send_message("").await,
            Err(ChatError::EmptyMessage)
        ));
    }
}
