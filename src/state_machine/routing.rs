//! Interpretation of agent replies into routing decisions
//!
//! Agents signal routing by embedding plain-text markers in their replies.
//! Node code only consumes [`RoutingDecision`], so the detection rule can be
//! swapped without touching the nodes.

use super::state::{AgentName, Next};

/// Marker a specialist emits when the request is outside its competence
pub const HANDOFF_MARKER: &str = "HANDOFF_TO_TRIAGE";

/// Reason recorded when a specialist hands control back
pub const CANNOT_HANDLE_REASON: &str = "cannot_handle_request";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Triage delegates to a specialist
    Delegate(AgentName),
    /// Specialist hands back to triage
    Handoff,
    /// Reply ends the turn
    NoRoute,
}

impl RoutingDecision {
    pub fn next(self) -> Next {
        match self {
            RoutingDecision::Delegate(agent) => Next::Agent(agent),
            RoutingDecision::Handoff => Next::Agent(AgentName::Triage),
            RoutingDecision::NoRoute => Next::End,
        }
    }
}

/// Scan a triage reply for specialist markers. Markers are checked in
/// [`AgentName::SPECIALISTS`] order and the first one present wins.
pub fn interpret_triage_reply(reply: &str) -> RoutingDecision {
    AgentName::SPECIALISTS
        .into_iter()
        .find(|agent| agent.route_marker().is_some_and(|marker| reply.contains(marker)))
        .map_or(RoutingDecision::NoRoute, RoutingDecision::Delegate)
}

pub fn interpret_specialist_reply(reply: &str) -> RoutingDecision {
    if reply.contains(HANDOFF_MARKER) {
        RoutingDecision::Handoff
    } else {
        RoutingDecision::NoRoute
    }
}
