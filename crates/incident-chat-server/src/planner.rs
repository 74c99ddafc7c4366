use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::OpenAiConfig;
use crate::error::{ServerError, ServerResult};
use crate::tools::tool_definitions;

pub const SYSTEM_PROMPT: &str = "\
You translate questions about an incident ticket dataset into exactly one tool call.

Filterable fields: company, status, priority, category, assigned_to.

- Use filter_tickets when the user wants to see or list tickets.
- Use count_tickets when the user asks how many, or for a total.
- Use group_by_tickets when the user asks for a breakdown per field or per month.
- Put every value the user mentions into the filters object.
- Month names go into date_filter as a month number from 1 to 12; years go into date_filter.year.

Reply with a tool call only, never with prose.";

/// A tool invocation chosen by the model for a user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCall {
    pub name: String,
    /// Raw JSON argument text; empty when the model sent none.
    pub arguments: String,
}

#[async_trait]
pub trait ToolPlanner: Send + Sync {
    /// Returns the first tool call for `message`, or `None` when the model declined.
    async fn plan(&self, message: &str) -> ServerResult<Option<PlannedCall>>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<PromptMessage<'a>>,
    tools: Vec<Value>,
    tool_choice: &'static str,
}

#[derive(Debug, Serialize)]
struct PromptMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

impl FunctionCall {
    fn into_planned(self) -> PlannedCall {
        let arguments = match self.arguments {
            Value::Null => String::new(),
            Value::String(s) => s,
            other => other.to_string(),
        };
        PlannedCall {
            name: self.name,
            arguments,
        }
    }
}

/// Planner backed by an OpenAI-compatible chat completions endpoint.
pub struct OpenAiPlanner {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiPlanner {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn from_config(config: &OpenAiConfig) -> ServerResult<Self> {
        if config.api_key.is_empty() {
            return Err(ServerError::Config(
                incident_chat_core::ConfigLoadError::MissingRequired(
                    "server.openai.api_key (or OPENAI_API_KEY)".to_string(),
                ),
            ));
        }
        Ok(Self::new(&config.api_key, &config.base_url, &config.model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ToolPlanner for OpenAiPlanner {
    async fn plan(&self, message: &str) -> ServerResult<Option<PlannedCall>> {
        let request = CompletionRequest {
            model: &self.model,
            messages: vec![
                PromptMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                PromptMessage {
                    role: "user",
                    content: message,
                },
            ],
            tools: tool_definitions(),
            tool_choice: "auto",
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServerError::Planner(format!(
                "model API returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ServerError::Planner(format!("unreadable model response: {}", e)))?;

        let call = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.tool_calls)
            .and_then(|calls| calls.into_iter().next())
            .map(|call| call.function.into_planned());

        debug!(model = %self.model, tool = ?call.as_ref().map(|c| &c.name), "planned tool call");
        Ok(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_arguments_as_string_or_object() {
        let call: FunctionCall =
            serde_json::from_value(json!({"name": "count_tickets", "arguments": "{\"a\":1}"}))
                .unwrap();
        assert_eq!(call.into_planned().arguments, "{\"a\":1}");

        let call: FunctionCall =
            serde_json::from_value(json!({"name": "count_tickets", "arguments": {"a": 1}}))
                .unwrap();
        assert_eq!(call.into_planned().arguments, "{\"a\":1}");

        let call: FunctionCall = serde_json::from_value(json!({"name": "count_tickets"})).unwrap();
        assert_eq!(call.into_planned().arguments, "");
    }

    #[test]
    fn test_missing_api_key() {
        let config = OpenAiConfig {
            api_key: String::new(),
            ..OpenAiConfig::default()
        };
        assert!(matches!(
            OpenAiPlanner::from_config(&config),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let planner = OpenAiPlanner::new("k", "http://localhost:9/v1/", "m");
        assert_eq!(planner.base_url, "http://localhost:9/v1");
        assert_eq!(planner.model(), "m");
    }
}
