use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("json error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response has no reply field")]
    MissingReply,

    #[error("chat session closed")]
    SessionClosed,
}

pub type ChatResult<T> = Result<T, ChatError>;

impl ChatError {
    /// Short text shown next to a failed message in the widget.
    pub fn summary(&self) -> String {
        match self {
            Self::Http(e) if e.is_connect() => "could not reach the chat service".to_string(),
            Self::Status { status, .. } => format!("chat service returned {}", status),
            other => other.to_string(),
        }
    }
}
