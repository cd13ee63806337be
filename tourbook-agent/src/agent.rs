use crate::error::AgentError;
use crate::llm::{ChatModel, ModelTurn, OpenAiChatModel};
use crate::message::ChatMessage;
use crate::prompt::SYSTEM_PROMPT;
use crate::session::{InMemorySessionStore, RedisSessionStore, SessionStore};
use crate::settings::{AgentSettings, SessionBackend};
use crate::tools::{BackendTools, ToolExecutor};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const ITERATION_LIMIT_REPLY: &str = "Agent stopped due to iteration limit.";

#[derive(Debug, Clone, PartialEq)]
pub struct AgentReply {
    pub output: String,
    /// Set when the turn failed; `output` then carries the user-facing message.
    pub error: Option<String>,
}

/// Drives the model/tool loop for one message at a time per call. Cheap to
/// share behind an `Arc`; all state lives in the session store.
pub struct TourAgent {
    model: Arc<dyn ChatModel>,
    tools: Arc<dyn ToolExecutor>,
    sessions: Arc<dyn SessionStore>,
    max_iterations: usize,
}

impl TourAgent {
    pub fn new(
        model: Arc<dyn ChatModel>,
        tools: Arc<dyn ToolExecutor>,
        sessions: Arc<dyn SessionStore>,
        max_iterations: usize,
    ) -> Self {
        Self {
            model,
            tools,
            sessions,
            max_iterations: max_iterations.max(1),
        }
    }

    /// Production wiring: OpenAI-compatible model, HTTP tools against
    /// `backend_url`, and the configured session backend.
    pub fn from_settings(settings: &AgentSettings) -> Result<Self, AgentError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AgentError::NotConfigured("no API key".into()))?;

        let model = OpenAiChatModel::new(
            &settings.base_url,
            api_key,
            settings.model.clone(),
            settings.temperature,
            Duration::from_secs(settings.request_timeout_seconds),
        );
        let tools = BackendTools::new(&settings.backend_url)?;
        let sessions: Arc<dyn SessionStore> = match settings.session_backend {
            SessionBackend::Memory => Arc::new(InMemorySessionStore::new()),
            SessionBackend::Redis => Arc::new(RedisSessionStore::new(
                &settings.redis_url,
                settings.session_ttl_seconds,
            )?),
        };

        info!(
            model = %settings.model,
            backend = %settings.backend_url,
            sessions = ?settings.session_backend,
            "tour agent ready"
        );
        Ok(Self::new(
            Arc::new(model),
            Arc::new(tools),
            sessions,
            settings.max_iterations,
        ))
    }

    /// Answers one user message. Failures never escape: the error text is
    /// recorded in the session like any other answer.
    pub async fn process(&self, query: &str, session_id: &str) -> AgentReply {
        let reply = match self.run(query, session_id).await {
            Ok(output) => AgentReply {
                output,
                error: None,
            },
            Err(e) => {
                warn!(session_id, error = %e, "agent turn failed");
                AgentReply {
                    output: format!("An error occurred while processing the request: {}", e),
                    error: Some(e.to_string()),
                }
            }
        };

        let exchange = [
            ChatMessage::user(query),
            ChatMessage::assistant(reply.output.clone()),
        ];
        if let Err(e) = self.sessions.append(session_id, &exchange).await {
            warn!(session_id, error = %e, "could not record exchange");
        }
        reply
    }

    pub async fn clear_session(&self, session_id: &str) -> Result<(), AgentError> {
        self.sessions.clear(session_id).await?;
        info!(session_id, "session cleared");
        Ok(())
    }

    async fn run(&self, query: &str, session_id: &str) -> Result<String, AgentError> {
        let history = self.sessions.get_history(session_id).await?;
        let definitions = self.tools.definitions();

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(SYSTEM_PROMPT));
        messages.extend(history);
        messages.push(ChatMessage::user(query));

        for iteration in 1..=self.max_iterations {
            match self.model.complete(&messages, &definitions).await? {
                ModelTurn::Content(answer) => {
                    debug!(session_id, iteration, "model answered");
                    return Ok(answer);
                }
                ModelTurn::ToolCalls { calls, content } => {
                    debug!(session_id, iteration, calls = calls.len(), "model requested tools");
                    messages.push(ChatMessage::assistant_tool_calls(content, calls.clone()));
                    for call in calls {
                        let result = self
                            .tools
                            .execute(&call.function.name, &call.function.arguments)
                            .await;
                        messages.push(ChatMessage::tool_result(call.id, result.to_string()));
                    }
                }
            }
        }

        warn!(session_id, limit = self.max_iterations, "iteration limit reached");
        Ok(ITERATION_LIMIT_REPLY.to_string())
    }
}
