//! API request and response types

use crate::agents::AgentInfo;
use crate::state_machine::{AgentName, AirlineContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub message: String,
}

/// One assistant message shown to the customer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageResponse {
    pub content: String,
    pub agent: String,
}

/// Timeline entry for the client's event panel
#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub agent: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    pub timestamp: f64,
}

/// Input guardrail verdict. No guardrails run, so this list is always empty.
#[derive(Debug, Clone, Serialize)]
pub struct GuardrailCheck {
    pub id: String,
    pub name: String,
    pub input: String,
    pub reasoning: String,
    pub passed: bool,
    pub timestamp: f64,
}

/// Response for a chat turn
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub conversation_id: String,
    pub current_agent: AgentName,
    pub messages: Vec<MessageResponse>,
    pub events: Vec<EventResponse>,
    pub context: AirlineContext,
    pub agents: Vec<AgentInfo>,
    pub guardrails: Vec<GuardrailCheck>,
    pub routing_history: Vec<AgentName>,
}

/// Response with a list of conversation ids
#[derive(Debug, Serialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<String>,
}

/// Response with the agent catalog
#[derive(Debug, Serialize)]
pub struct AgentsResponse {
    pub agents: Vec<AgentInfo>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub models: Vec<String>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
