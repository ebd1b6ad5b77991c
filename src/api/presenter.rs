//! Turns a stored conversation into the client-visible slice of one turn
//!
//! Clients only receive what a turn added. Messages, audit events and
//! routing entries are sliced at the lengths recorded before the turn ran.

use super::types::{ChatResponse, EventResponse, MessageResponse};
use crate::agents::agent_catalog;
use crate::runtime::ChatTurn;
use crate::state_machine::{AgentEvent, AgentName, ConversationRecord, Message};
use crate::tools::DISPLAY_SEAT_MAP;
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64())
}

fn event(kind: &str, agent: &str, content: impl Into<String>, metadata: Option<serde_json::Value>) -> EventResponse {
    EventResponse {
        id: uuid::Uuid::new_v4().simple().to_string(),
        kind: kind.to_string(),
        agent: agent.to_string(),
        content: content.into(),
        metadata,
        timestamp: now_secs(),
    }
}

/// Response for a conversation that was created but has not run any agent
pub fn initial_response(conversation_id: String, record: ConversationRecord) -> ChatResponse {
    ChatResponse {
        conversation_id,
        current_agent: record.current_agent,
        messages: Vec::new(),
        events: Vec::new(),
        context: record.context,
        agents: agent_catalog(),
        guardrails: Vec::new(),
        routing_history: record.routing_history,
    }
}

pub fn present_turn(turn: ChatTurn) -> ChatResponse {
    let ChatTurn {
        conversation_id,
        record,
        previous_message_count,
        previous_event_count,
        previous_routing_len,
    } = turn;

    let mut messages = Vec::new();
    let mut events = handoff_events(record.routing_history.get(previous_routing_len..).unwrap_or_default());

    for message in record.messages.iter().skip(previous_message_count) {
        match message {
            Message::User { content } => {
                events.push(event("message", "user", content.as_str(), None));
            }
            Message::Assistant { content, agent, .. } => {
                if content.is_empty() {
                    continue;
                }
                messages.push(MessageResponse {
                    content: content.clone(),
                    agent: agent.to_string(),
                });
                events.push(event("message", agent.as_str(), content.as_str(), None));
            }
            Message::Tool {
                tool_call_id,
                content,
                is_error,
            } => {
                events.push(event(
                    "tool_output",
                    record.current_agent.as_str(),
                    content.as_str(),
                    Some(json!({ "tool_call_id": tool_call_id, "is_error": is_error })),
                ));
            }
        }
    }

    for audit in record.events.iter().skip(previous_event_count) {
        match audit {
            AgentEvent::AgentResponse { .. } => {}
            AgentEvent::ToolCall {
                agent,
                tool,
                args,
                result,
            } => {
                events.push(event(
                    "tool_call",
                    agent.as_str(),
                    tool.as_str(),
                    Some(json!({ "tool_name": tool, "tool_args": args, "tool_result": result })),
                ));
                if tool == "display_seat_map" {
                    messages.push(MessageResponse {
                        content: DISPLAY_SEAT_MAP.to_string(),
                        agent: agent.to_string(),
                    });
                }
            }
            AgentEvent::ToolError { agent, tool, error } => {
                events.push(event(
                    "tool_error",
                    agent.as_str(),
                    error.as_str(),
                    Some(json!({ "tool_name": tool })),
                ));
            }
        }
    }

    ChatResponse {
        conversation_id,
        current_agent: record.current_agent,
        messages,
        events,
        context: record.context,
        agents: agent_catalog(),
        guardrails: Vec::new(),
        routing_history: record.routing_history,
    }
}

/// One handoff per consecutive pair of differing agents
fn handoff_events(routing: &[AgentName]) -> Vec<EventResponse> {
    routing
        .windows(2)
        .filter(|pair| pair[0] != pair[1])
        .map(|pair| {
            let (source, target) = (pair[0], pair[1]);
            event(
                "handoff",
                target.as_str(),
                format!("Handoff from {source} to {target}"),
                Some(json!({ "source_agent": source, "target_agent": target })),
            )
        })
        .collect()
}
