//! Conversation state types

use super::context::AirlineContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Agents and routing targets
// ============================================================================

/// One of the five conversational agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentName {
    Triage,
    SeatBooking,
    FlightStatus,
    Cancellation,
    Faq,
}

impl AgentName {
    pub const ALL: [AgentName; 5] = [
        AgentName::Triage,
        AgentName::SeatBooking,
        AgentName::FlightStatus,
        AgentName::Cancellation,
        AgentName::Faq,
    ];

    /// Specialists in the order triage checks their routing markers
    pub const SPECIALISTS: [AgentName; 4] = [
        AgentName::SeatBooking,
        AgentName::FlightStatus,
        AgentName::Cancellation,
        AgentName::Faq,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AgentName::Triage => "triage",
            AgentName::SeatBooking => "seat_booking",
            AgentName::FlightStatus => "flight_status",
            AgentName::Cancellation => "cancellation",
            AgentName::Faq => "faq",
        }
    }

    pub fn is_specialist(self) -> bool {
        !matches!(self, AgentName::Triage)
    }

    /// Names of the tools this agent may invoke
    pub fn tool_names(self) -> &'static [&'static str] {
        match self {
            AgentName::Triage => &[],
            AgentName::SeatBooking => &["update_seat", "display_seat_map"],
            AgentName::FlightStatus => &["flight_status"],
            AgentName::Cancellation => &["cancel_flight"],
            AgentName::Faq => &["faq_lookup", "baggage_lookup"],
        }
    }

    /// Marker triage emits to delegate to this agent
    pub fn route_marker(self) -> Option<&'static str> {
        match self {
            AgentName::Triage => None,
            AgentName::SeatBooking => Some("ROUTE_TO_SEAT_BOOKING"),
            AgentName::FlightStatus => Some("ROUTE_TO_FLIGHT_STATUS"),
            AgentName::Cancellation => Some("ROUTE_TO_CANCELLATION"),
            AgentName::Faq => Some("ROUTE_TO_FAQ"),
        }
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentName::ALL
            .into_iter()
            .find(|agent| agent.as_str() == s)
            .ok_or_else(|| format!("unknown agent: {s}"))
    }
}

/// Where control goes after a node finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Next {
    Agent(AgentName),
    End,
}

impl Next {
    pub const END: &'static str = "end";
}

impl From<AgentName> for Next {
    fn from(agent: AgentName) -> Self {
        Next::Agent(agent)
    }
}

impl fmt::Display for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Next::Agent(agent) => agent.fmt(f),
            Next::End => f.write_str(Self::END),
        }
    }
}

impl From<Next> for String {
    fn from(next: Next) -> Self {
        next.to_string()
    }
}

impl TryFrom<String> for Next {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s == Self::END {
            Ok(Next::End)
        } else {
            s.parse().map(Next::Agent)
        }
    }
}

// ============================================================================
// Messages and audit events
// ============================================================================

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// One entry of the conversation transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    User {
        content: String,
    },
    Assistant {
        content: String,
        agent: AgentName,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    pub fn assistant(agent: AgentName, content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Message::Assistant {
            content: content.into(),
            agent,
            tool_calls,
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>, is_error: bool) -> Self {
        Message::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
            is_error,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Message::User { .. })
    }
}

/// Audit log entry produced by agent nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    AgentResponse {
        agent: AgentName,
    },
    ToolCall {
        agent: AgentName,
        tool: String,
        args: Value,
        result: String,
    },
    ToolError {
        agent: AgentName,
        tool: String,
        error: String,
    },
}

// ============================================================================
// Conversation state
// ============================================================================

/// Transient state threaded through one run of the workflow graph
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    pub context: AirlineContext,
    pub current_agent: AgentName,
    pub next_agent: Next,
    pub events: Vec<AgentEvent>,
    pub routing_history: Vec<AgentName>,
    pub last_active_agent: Option<AgentName>,
    pub is_followup_message: bool,
    pub handoff_reason: Option<String>,
}

/// Persisted conversation: everything in [`ConversationState`] except the
/// per-run `next_agent` pointer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    #[serde(default)]
    pub messages: Vec<Message>,
    pub context: AirlineContext,
    pub current_agent: AgentName,
    #[serde(default)]
    pub events: Vec<AgentEvent>,
    #[serde(default)]
    pub routing_history: Vec<AgentName>,
    #[serde(default)]
    pub last_active_agent: Option<AgentName>,
    #[serde(default)]
    pub is_followup_message: bool,
    #[serde(default)]
    pub handoff_reason: Option<String>,
}

impl ConversationRecord {
    /// Empty conversation owned by triage
    pub fn new(context: AirlineContext) -> Self {
        Self {
            messages: Vec::new(),
            context,
            current_agent: AgentName::Triage,
            events: Vec::new(),
            routing_history: Vec::new(),
            last_active_agent: None,
            is_followup_message: false,
            handoff_reason: None,
        }
    }

    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(Message::is_user)
    }
}

impl ConversationState {
    /// Rebuild run state from a stored record and append the new user message.
    ///
    /// `next_agent` is seeded with the last specialist that was active so the
    /// entry resolver can resume it.
    pub fn begin_turn(record: ConversationRecord, message: impl Into<String>) -> Self {
        let is_followup_message = record.has_user_message();
        let next_agent = record.last_active_agent.map_or(Next::End, Next::Agent);

        let mut messages = record.messages;
        messages.push(Message::user(message));

        Self {
            messages,
            context: record.context,
            current_agent: record.current_agent,
            next_agent,
            events: record.events,
            routing_history: record.routing_history,
            last_active_agent: record.last_active_agent,
            is_followup_message,
            handoff_reason: record.handoff_reason,
        }
    }

    pub fn into_record(self) -> ConversationRecord {
        ConversationRecord {
            messages: self.messages,
            context: self.context,
            current_agent: self.current_agent,
            events: self.events,
            routing_history: self.routing_history,
            last_active_agent: self.last_active_agent,
            is_followup_message: self.is_followup_message,
            handoff_reason: self.handoff_reason,
        }
    }

    /// Most recent user message, if any
    pub fn last_user_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_user())
    }
}
