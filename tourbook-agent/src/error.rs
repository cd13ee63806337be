#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("language model request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("language model returned {status}: {body}")]
    Provider { status: u16, body: String },
    #[error("malformed language model response: {0}")]
    MalformedResponse(String),
    #[error("session store error: {0}")]
    Session(String),
    #[error("agent is not configured: {0}")]
    NotConfigured(String),
}

impl From<redis::RedisError> for AgentError {
    fn from(err: redis::RedisError) -> Self {
        AgentError::Session(err.to_string())
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::Session(format!("transcript encoding: {}", err))
    }
}
