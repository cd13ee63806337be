use crate::error::AgentError;
use crate::message::{ChatMessage, ToolCall};
use crate::tools::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// What the model wants next: a final answer, or tools run first.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelTurn {
    Content(String),
    ToolCalls {
        calls: Vec<ToolCall>,
        content: Option<String>,
    },
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelTurn, AgentError>;
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiChatModel {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl OpenAiChatModel {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
            timeout,
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolDefinition],
}

fn no_tools(tools: &&[ToolDefinition]) -> bool {
    tools.is_empty()
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelTurn, AgentError> {
        let request = CompletionRequest {
            model: &self.model,
            temperature: self.temperature,
            messages,
            tools,
        };
        debug!(model = %self.model, messages = messages.len(), "requesting completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        if !(200..300).contains(&status) {
            return Err(AgentError::Provider { status, body });
        }
        parse_completion(&body)
    }
}

/// Reads the first choice of a non-streaming completion body. Providers that
/// report failures inside a 200 body (`{"error": {...}}`) surface as `Provider`.
pub fn parse_completion(body: &str) -> Result<ModelTurn, AgentError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| AgentError::MalformedResponse(e.to_string()))?;

    if let Some(err) = value.get("error") {
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown provider error");
        return Err(AgentError::Provider {
            status: 200,
            body: message.to_string(),
        });
    }

    let parsed: CompletionResponse = serde_json::from_value(value)
        .map_err(|e| AgentError::MalformedResponse(e.to_string()))?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AgentError::MalformedResponse("no choices in response".into()))?;

    let ChoiceMessage {
        content,
        tool_calls,
    } = choice.message;
    if !tool_calls.is_empty() {
        return Ok(ModelTurn::ToolCalls {
            calls: tool_calls,
            content: content.filter(|c| !c.is_empty()),
        });
    }
    match content {
        Some(text) => Ok(ModelTurn::Content(text)),
        None => Err(AgentError::MalformedResponse(
            "message has neither content nor tool calls".into(),
        )),
    }
}
