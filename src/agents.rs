//! Agent nodes: triage plus the four specialists
//!
//! Each node takes the run state by value, makes one model call and returns
//! the updated state with `next_agent` set.

mod prompts;
mod specialist;
mod triage;

pub use specialist::profile;

use crate::llm::LlmError;
use crate::runtime::{LlmClient, ToolExecutor};
use crate::state_machine::{AgentName, ConversationState};
use serde::Serialize;

/// Run the node for `agent` over `state`
pub async fn run_node<L, T>(
    agent: AgentName,
    state: ConversationState,
    llm: &L,
    tools: &T,
) -> Result<ConversationState, LlmError>
where
    L: LlmClient + ?Sized,
    T: ToolExecutor + ?Sized,
{
    match profile(agent) {
        Some(specialist) => specialist::run(specialist, state, llm, tools).await,
        None => triage::run(state, llm).await,
    }
}

/// Static description of an agent for clients
#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    pub name: AgentName,
    pub description: &'static str,
    pub tools: Vec<&'static str>,
    pub handoffs: Vec<AgentName>,
    pub can_route_to: Vec<AgentName>,
    pub input_guardrails: Vec<String>,
}

pub fn agent_catalog() -> Vec<AgentInfo> {
    AgentName::ALL
        .into_iter()
        .map(|agent| {
            let (description, targets) = match profile(agent) {
                Some(specialist) => (specialist.description, vec![AgentName::Triage]),
                None => (
                    "Routes customers to the appropriate specialist",
                    AgentName::SPECIALISTS.to_vec(),
                ),
            };
            AgentInfo {
                name: agent,
                description,
                tools: agent.tool_names().to_vec(),
                handoffs: targets.clone(),
                can_route_to: targets,
                input_guardrails: Vec::new(),
            }
        })
        .collect()
}
