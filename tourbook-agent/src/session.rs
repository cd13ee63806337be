use crate::error::AgentError;
use crate::message::ChatMessage;
use async_trait::async_trait;
use redis::AsyncCommands;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Per-session conversation transcript. A session exists once something
/// has been appended to it and disappears on `clear`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get_history(&self, session_id: &str) -> Result<Vec<ChatMessage>, AgentError>;
    async fn append(&self, session_id: &str, messages: &[ChatMessage]) -> Result<(), AgentError>;
    async fn clear(&self, session_id: &str) -> Result<(), AgentError>;
}

/// Process-local transcripts. Nothing expires.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Vec<ChatMessage>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_history(&self, session_id: &str) -> Result<Vec<ChatMessage>, AgentError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn append(&self, session_id: &str, messages: &[ChatMessage]) -> Result<(), AgentError> {
        self.sessions
            .write()
            .await
            .entry(session_id.to_string())
            .or_default()
            .extend_from_slice(messages);
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> Result<(), AgentError> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}

/// Transcripts as a Redis list of JSON messages, one key per session.
/// With a TTL, every append pushes the expiry forward.
pub struct RedisSessionStore {
    client: redis::Client,
    ttl_seconds: Option<u64>,
}

impl RedisSessionStore {
    pub fn new(connection_string: &str, ttl_seconds: Option<u64>) -> Result<Self, AgentError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self {
            client,
            ttl_seconds,
        })
    }
}

fn session_key(session_id: &str) -> String {
    format!("chat:session:{}", session_id)
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get_history(&self, session_id: &str) -> Result<Vec<ChatMessage>, AgentError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Vec<String> = conn.lrange(session_key(session_id), 0, -1).await?;
        raw.iter()
            .map(|entry| serde_json::from_str(entry).map_err(AgentError::from))
            .collect()
    }

    async fn append(&self, session_id: &str, messages: &[ChatMessage]) -> Result<(), AgentError> {
        if messages.is_empty() {
            return Ok(());
        }
        let payloads = messages
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;

        let key = session_key(session_id);
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let mut pipe = redis::pipe();
        pipe.atomic().rpush(&key, payloads).ignore();
        if let Some(ttl) = self.ttl_seconds {
            pipe.expire(&key, ttl as i64).ignore();
        }
        let () = pipe.query_async(&mut conn).await?;
        debug!(session_id, appended = messages.len(), "session transcript extended");
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> Result<(), AgentError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(session_key(session_id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_keeps_sessions_apart() {
        let store = InMemorySessionStore::new();
        store
            .append("a", &[ChatMessage::user("hi"), ChatMessage::assistant("hello")])
            .await
            .unwrap();
        store.append("b", &[ChatMessage::user("other")]).await.unwrap();

        assert_eq!(store.get_history("a").await.unwrap().len(), 2);
        assert_eq!(store.get_history("b").await.unwrap().len(), 1);
        assert!(store.get_history("missing").await.unwrap().is_empty());
        assert_eq!(store.sessions.read().await.len(), 2);

        store.clear("a").await.unwrap();
        assert!(store.get_history("a").await.unwrap().is_empty());
        assert_eq!(store.sessions.read().await.len(), 1);
    }

    #[test]
    fn test_session_key_is_namespaced() {
        assert_eq!(session_key("web-42"), "chat:session:web-42");
    }

    #[test]
    fn test_redis_store_rejects_bad_url() {
        assert!(matches!(
            RedisSessionStore::new("not a url", None),
            Err(AgentError::Session(_))
        ));
    }
}
