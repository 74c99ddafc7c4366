use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;
use tracing::error;

use incident_chat_core::ConfigLoadError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("dataset error at record {record}: {message}")]
    Dataset { record: u64, message: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("planner error: {0}")]
    Planner(String),

    #[error("tool error: {0}")]
    Tool(String),

    #[error("config error: {0}")]
    Config(#[from] ConfigLoadError),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Tool(_) => StatusCode::BAD_REQUEST,
            Self::Planner(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_json_error(&self) -> serde_json::Value {
        serde_json::json!({
            "error": true,
            "message": self.to_string()
        })
    }
}

impl From<reqwest::Error> for ServerError {
    fn from(err: reqwest::Error) -> Self {
        Self::Planner(err.to_string())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        error!(status = status.as_u16(), "chat request failed: {}", self);
        (status, Json(self.to_json_error())).into_response()
    }
}
