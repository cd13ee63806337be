//! Conversational client for the tour booking API.
//!
//! The language model decides which API calls to make; this crate only ships
//! the tool schemas, executes the calls over HTTP and keeps per-session
//! transcripts.

pub mod agent;
pub mod error;
pub mod llm;
pub mod message;
pub mod prompt;
pub mod session;
pub mod settings;
pub mod tools;

pub use agent::{AgentReply, TourAgent};
pub use error::AgentError;
pub use llm::{ChatModel, ModelTurn, OpenAiChatModel};
pub use message::{ChatMessage, Role, ToolCall};
pub use session::{InMemorySessionStore, RedisSessionStore, SessionStore};
pub use settings::{AgentSettings, SessionBackend};
pub use tools::{BackendTools, ToolDefinition, ToolExecutor};
