//! What an agent node sends to a model and what comes back

use crate::state_machine::{AgentName, Message, ToolCall};

/// One model call on behalf of `agent`
///
/// The transcript is the conversation's own message list; each client
/// translates it to its wire format.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub agent: AgentName,
    pub system: String,
    pub messages: Vec<Message>,
    /// Empty for triage, which never calls tools
    pub tools: Vec<ToolDefinition>,
}

/// Tool offered to the model
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Usage,
}

#[derive(Debug, Clone, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
