//! Workflow executor: runs one inbound message through the agent graph

use super::graph::{self, NodeId};
use super::traits::{LlmClient, ToolExecutor};
use crate::agents;
use crate::llm::LlmError;
use crate::state_machine::{
    resolve_entry, AgentName, AirlineContext, ConversationRecord, ConversationState, Next,
};
use thiserror::Error;

pub const DEFAULT_MAX_HOPS: usize = 8;

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Agent nodes allowed per turn before the run is stopped
    pub max_hops: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
        }
    }
}

/// Why a turn failed. Nothing is persisted for a failed turn.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("language model failure: {0}")]
    Llm(#[from] LlmError),
    #[error("conversation store failure: {0}")]
    Store(String),
    #[error("no edge from {from} to {to}")]
    InvalidRoute { from: NodeId, to: Next },
}

/// Runs agent nodes until one sets `next_agent = end`
pub struct WorkflowExecutor<L, T> {
    llm: L,
    tools: T,
    config: ExecutorConfig,
}

impl<L, T> WorkflowExecutor<L, T>
where
    L: LlmClient,
    T: ToolExecutor,
{
    pub fn new(llm: L, tools: T, config: ExecutorConfig) -> Self {
        Self { llm, tools, config }
    }

    /// Process one inbound message against an optional stored conversation
    pub async fn process_turn(
        &self,
        message: &str,
        record: Option<ConversationRecord>,
    ) -> Result<ConversationRecord, TurnError> {
        let record = record.unwrap_or_else(|| {
            ConversationRecord::new(AirlineContext::for_new_conversation(&mut rand::thread_rng()))
        });
        let state = ConversationState::begin_turn(record, message);
        let state = self.run(state).await?;
        Ok(state.into_record())
    }

    /// Drive the graph from `smart_entry` to `end`
    pub async fn run(&self, mut state: ConversationState) -> Result<ConversationState, TurnError> {
        let entry = resolve_entry(&state);
        tracing::info!(
            %entry,
            model = self.llm.model_id(),
            followup = state.is_followup_message,
            last_active = ?state.last_active_agent,
            "Resolved entry point"
        );
        state.next_agent = Next::Agent(entry);
        if entry != AgentName::Triage {
            state.current_agent = entry;
        }

        let mut from = NodeId::SmartEntry;
        let mut hops = 0;
        loop {
            let to = state.next_agent;
            if !graph::allows(from, to) {
                return Err(TurnError::InvalidRoute { from, to });
            }
            let Next::Agent(agent) = to else {
                break;
            };
            if hops >= self.config.max_hops {
                tracing::warn!(
                    hops,
                    pending = %agent,
                    history = ?state.routing_history,
                    "Hop limit reached, ending turn"
                );
                state.next_agent = Next::End;
                break;
            }

            tracing::debug!(%from, %agent, "Running node");
            state = agents::run_node(agent, state, &self.llm, &self.tools).await?;
            hops += 1;
            from = NodeId::Agent(agent);
        }

        Ok(state)
    }
}
