//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::{LlmClient, ToolExecutor};
use crate::llm::{LlmError, LlmRequest, LlmResponse, ToolDefinition};
use crate::state_machine::{AgentName, ToolCall};
use crate::tools::ToolOutput;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Response builders
// ============================================================================

/// Text reply with no tool calls
pub fn text_response(text: &str) -> LlmResponse {
    LlmResponse {
        text: text.to_string(),
        ..LlmResponse::default()
    }
}

/// Reply that requests the given tool calls, `(id, name, args)`
pub fn tool_response(text: &str, calls: &[(&str, &str, Value)]) -> LlmResponse {
    LlmResponse {
        text: text.to_string(),
        tool_calls: calls
            .iter()
            .map(|(id, name, args)| ToolCall {
                id: (*id).to_string(),
                name: (*name).to_string(),
                arguments: args.clone(),
            })
            .collect(),
        ..LlmResponse::default()
    }
}

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock model client that returns queued responses
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a plain text reply
    pub fn queue_text(&self, text: &str) {
        self.queue_response(text_response(text));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Agents that were invoked, in order
    pub fn invoked_agents(&self) -> Vec<AgentName> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.agent)
            .collect()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Scripted LLM Client
// ============================================================================

type Script = dyn Fn(AgentName, &LlmRequest) -> Result<LlmResponse, LlmError> + Send + Sync;

/// Model client whose reply is computed from the agent being prompted
pub struct ScriptedLlmClient {
    script: Box<Script>,
    delay: Duration,
    calls: Mutex<Vec<AgentName>>,
}

impl ScriptedLlmClient {
    pub fn new(
        script: impl Fn(AgentName, &LlmRequest) -> Result<LlmResponse, LlmError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before every reply
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<AgentName> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.calls.lock().unwrap().push(request.agent);
        (self.script)(request.agent, request)
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}

// ============================================================================
// Mock Tool Executor
// ============================================================================

/// Mock tool executor with predefined outputs. Tools not configured are unknown.
pub struct MockToolExecutor {
    outputs: HashMap<String, ToolOutput>,
    /// Record of tool executions
    pub executions: Mutex<Vec<(AgentName, String, Value)>>,
}

impl MockToolExecutor {
    pub fn new() -> Self {
        Self {
            outputs: HashMap::new(),
            executions: Mutex::new(Vec::new()),
        }
    }

    /// Add a tool with a predefined output
    #[must_use]
    pub fn with_tool(mut self, name: impl Into<String>, output: ToolOutput) -> Self {
        self.outputs.insert(name.into(), output);
        self
    }

    pub fn recorded_executions(&self) -> Vec<(AgentName, String, Value)> {
        self.executions.lock().unwrap().clone()
    }
}

impl Default for MockToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutor for MockToolExecutor {
    async fn execute(&self, agent: AgentName, name: &str, input: Value) -> Option<ToolOutput> {
        self.executions
            .lock()
            .unwrap()
            .push((agent, name.to_string(), input));
        self.outputs.get(name).cloned()
    }

    fn definitions(&self, agent: AgentName) -> Vec<ToolDefinition> {
        agent
            .tool_names()
            .iter()
            .filter(|name| self.outputs.contains_key(**name))
            .map(|name| ToolDefinition {
                name: (*name).to_string(),
                description: format!("Mock {name}"),
                input_schema: serde_json::json!({ "type": "object", "properties": {} }),
            })
            .collect()
    }
}
