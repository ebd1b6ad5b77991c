//! Triage node: classify the request and pick a specialist

use super::prompts::triage_prompt;
use crate::llm::{LlmError, LlmRequest};
use crate::runtime::LlmClient;
use crate::state_machine::{
    interpret_triage_reply, AgentEvent, AgentName, ConversationState, Message,
};

pub(super) async fn run<L: LlmClient + ?Sized>(
    mut state: ConversationState,
    llm: &L,
) -> Result<ConversationState, LlmError> {
    let request = LlmRequest {
        agent: AgentName::Triage,
        system: triage_prompt(&state.context),
        messages: state.messages.clone(),
        tools: Vec::new(),
    };

    let response = llm.complete(&request).await?;
    let reply = response.text;
    let decision = interpret_triage_reply(&reply);
    tracing::info!(agent = %AgentName::Triage, next = %decision.next(), "Triage decision");

    // Re-append the triggering user message so the specialist sees it last
    let duplicated = state.last_user_message().cloned();
    state
        .messages
        .push(Message::assistant(AgentName::Triage, reply, Vec::new()));
    state.messages.extend(duplicated);

    state.current_agent = AgentName::Triage;
    state.next_agent = decision.next();
    state.events.push(AgentEvent::AgentResponse {
        agent: AgentName::Triage,
    });
    state.routing_history.push(AgentName::Triage);

    Ok(state)
}
