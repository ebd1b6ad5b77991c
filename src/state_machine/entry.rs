//! Entry-point resolution for an inbound message

use super::state::{AgentName, ConversationState, Next};

/// Pick the first agent to run this turn. First matching rule wins.
pub fn resolve_entry(state: &ConversationState) -> AgentName {
    if state.messages.len() <= 1 {
        return AgentName::Triage;
    }

    let has_handoff_reason = state.handoff_reason.as_deref().is_some_and(|r| !r.is_empty());
    if state.next_agent == Next::Agent(AgentName::Triage) || has_handoff_reason {
        return AgentName::Triage;
    }

    match state.last_active_agent {
        Some(agent) if agent != AgentName::Triage && state.is_followup_message => agent,
        _ => AgentName::Triage,
    }
}
