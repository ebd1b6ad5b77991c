//! Workflow graph: which node may hand control to which

use crate::state_machine::{AgentName, Next};
use std::fmt;

/// A node in the workflow graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    /// Synthetic entry node that forwards the resolver's choice
    SmartEntry,
    Agent(AgentName),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::SmartEntry => f.write_str("smart_entry"),
            NodeId::Agent(agent) => agent.fmt(f),
        }
    }
}

/// Whether the graph has an edge from `from` to `to`.
///
/// Every node may end the run. `smart_entry` and specialists may reach any
/// agent; triage may reach only the specialists.
pub fn allows(from: NodeId, to: Next) -> bool {
    match (from, to) {
        (_, Next::End) | (NodeId::SmartEntry, Next::Agent(_)) => true,
        (NodeId::Agent(AgentName::Triage), Next::Agent(target)) => target.is_specialist(),
        (NodeId::Agent(_), Next::Agent(_)) => true,
    }
}
