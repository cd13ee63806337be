use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tourbook_agent::agent::ITERATION_LIMIT_REPLY;
use tourbook_agent::message::FunctionCall;
use tourbook_agent::tools::tool_definitions;
use tourbook_agent::{
    AgentError, ChatMessage, ChatModel, InMemorySessionStore, ModelTurn, Role, SessionStore,
    ToolCall, ToolDefinition, ToolExecutor, TourAgent,
};

/// Plays back queued turns; once empty, keeps asking for the same tool.
struct ScriptedModel {
    turns: Mutex<VecDeque<Result<ModelTurn, AgentError>>>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    fn new(turns: Vec<Result<ModelTurn, AgentError>>) -> Arc<Self> {
        Arc::new(Self {
            turns: Mutex::new(turns.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    fn last_prompt(&self) -> Vec<ChatMessage> {
        self.seen.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelTurn, AgentError> {
        assert_eq!(tools.len(), 5);
        self.seen.lock().unwrap().push(messages.to_vec());
        self.turns
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(tool_turn("loop", "get_tours", "{}")))
    }
}

#[derive(Default)]
struct RecordingTools {
    calls: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ToolExecutor for RecordingTools {
    fn definitions(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    async fn execute(&self, name: &str, arguments: &str) -> Value {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), arguments.to_string()));
        match name {
            "get_tour_details" => json!({"success": true, "data": {"id": 1, "available_slots": 7}}),
            _ => json!({"success": true, "data": {"tours": [], "total": 0}}),
        }
    }
}

fn tool_turn(id: &str, name: &str, arguments: &str) -> ModelTurn {
    ModelTurn::ToolCalls {
        calls: vec![ToolCall {
            id: id.to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }],
        content: None,
    }
}

fn agent(
    model: Arc<ScriptedModel>,
    tools: Arc<RecordingTools>,
    sessions: Arc<InMemorySessionStore>,
) -> TourAgent {
    TourAgent::new(model, tools, sessions, 5)
}

#[tokio::test]
async fn test_tool_result_feeds_final_answer() {
    let model = ScriptedModel::new(vec![
        Ok(tool_turn("call_1", "get_tour_details", "{\"tour_id\": 1}")),
        Ok(ModelTurn::Content("Tour 1 has 7 seats left.".into())),
    ]);
    let tools = Arc::new(RecordingTools::default());
    let sessions = Arc::new(InMemorySessionStore::new());
    let agent = agent(model.clone(), tools.clone(), sessions.clone());

    let reply = agent.process("How many seats on tour 1?", "s1").await;

    assert_eq!(reply.output, "Tour 1 has 7 seats left.");
    assert!(reply.error.is_none());
    assert_eq!(model.calls(), 2);
    assert_eq!(
        tools.calls.lock().unwrap().as_slice(),
        &[("get_tour_details".to_string(), "{\"tour_id\": 1}".to_string())]
    );

    let prompt = model.last_prompt();
    let tool_msg = prompt.last().unwrap();
    assert_eq!(tool_msg.role, Role::Tool);
    assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_1"));
    assert!(tool_msg.content.as_deref().unwrap().contains("\"available_slots\":7"));
}

#[tokio::test]
async fn test_history_is_replayed_on_next_turn() {
    let model = ScriptedModel::new(vec![
        Ok(ModelTurn::Content("Hello! Where would you like to go?".into())),
        Ok(ModelTurn::Content("Italy is lovely in July.".into())),
    ]);
    let sessions = Arc::new(InMemorySessionStore::new());
    let agent = agent(model.clone(), Arc::new(RecordingTools::default()), sessions.clone());

    agent.process("Hi", "s1").await;
    agent.process("Italy in July?", "s1").await;

    let prompt = model.last_prompt();
    let roles: Vec<Role> = prompt.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::System, Role::User, Role::Assistant, Role::User]
    );
    assert_eq!(prompt[1].content.as_deref(), Some("Hi"));
    assert_eq!(sessions.get_history("s1").await.unwrap().len(), 4);
    assert!(sessions.get_history("s2").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_model_failure_is_recorded_as_answer() {
    let model = ScriptedModel::new(vec![Err(AgentError::Provider {
        status: 429,
        body: "rate limited".into(),
    })]);
    let sessions = Arc::new(InMemorySessionStore::new());
    let agent = agent(model, Arc::new(RecordingTools::default()), sessions.clone());

    let reply = agent.process("Find tours", "s1").await;

    assert!(reply
        .output
        .starts_with("An error occurred while processing the request: "));
    assert!(reply.error.as_deref().unwrap().contains("rate limited"));
    let history = sessions.get_history("s1").await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].content.as_deref(), Some(reply.output.as_str()));
}

#[tokio::test]
async fn test_iteration_limit_stops_the_loop() {
    let model = ScriptedModel::new(vec![]);
    let tools = Arc::new(RecordingTools::default());
    let agent = agent(model.clone(), tools.clone(), Arc::new(InMemorySessionStore::new()));

    let reply = agent.process("Keep searching", "s1").await;

    assert_eq!(reply.output, ITERATION_LIMIT_REPLY);
    assert_eq!(model.calls(), 5);
    assert_eq!(tools.calls.lock().unwrap().len(), 5);
}

#[tokio::test]
async fn test_clear_session_forgets_history() {
    let model = ScriptedModel::new(vec![
        Ok(ModelTurn::Content("first".into())),
        Ok(ModelTurn::Content("second".into())),
    ]);
    let sessions = Arc::new(InMemorySessionStore::new());
    let agent = agent(model.clone(), Arc::new(RecordingTools::default()), sessions.clone());

    agent.process("one", "s1").await;
    agent.clear_session("s1").await.unwrap();
    agent.process("two", "s1").await;

    assert_eq!(model.last_prompt().len(), 2);
    assert_eq!(sessions.get_history("s1").await.unwrap().len(), 2);
}
