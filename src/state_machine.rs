//! Core routing state machine
//!
//! Conversation state, customer context, routing-marker interpretation and
//! the entry-point resolver. Everything here is pure: no I/O, no model calls.

pub mod context;
pub mod entry;
pub mod routing;
pub mod state;

#[cfg(test)]
mod proptests;

pub use context::{AirlineContext, ContextUpdate};
pub use entry::resolve_entry;
pub use routing::{interpret_specialist_reply, interpret_triage_reply, RoutingDecision};
pub use state::{
    AgentEvent, AgentName, ConversationRecord, ConversationState, Message, Next, ToolCall,
};
