//! Property-based tests for the routing state machine
//!
//! Conversations are driven through the real executor with scripted model
//! replies, checking the cross-turn invariants after every turn.

use super::*;
use crate::llm::LlmResponse;
use crate::runtime::testing::{text_response, tool_response, MockToolExecutor, ScriptedLlmClient};
use crate::runtime::{ExecutorConfig, WorkflowExecutor};
use crate::tools::ToolOutput;
use proptest::prelude::*;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// ============================================================================
// Test Helpers
// ============================================================================

/// What the model says on one call, whichever agent is asking
#[derive(Debug, Clone)]
enum Reply {
    Plain(String),
    Route(AgentName),
    Handoff,
    SeatUpdate,
    BrokenTool,
}

impl Reply {
    fn response(&self) -> LlmResponse {
        match self {
            Reply::Plain(text) => text_response(text),
            Reply::Route(agent) => {
                let marker = agent.route_marker().unwrap_or_default();
                text_response(&format!("Connecting you now. {marker}"))
            }
            Reply::Handoff => text_response("Not my area. HANDOFF_TO_TRIAGE"),
            Reply::SeatUpdate => tool_response(
                "Updating your seat.",
                &[("t-seat", "update_seat", json!({ "new_seat": "14C" }))],
            ),
            Reply::BrokenTool => tool_response(
                "Let me check.",
                &[("t-broken", "flight_status", json!({ "flight_number": 7 }))],
            ),
        }
    }
}

fn scripted(replies: Vec<Reply>) -> ScriptedLlmClient {
    let queue = Arc::new(Mutex::new(VecDeque::from(replies)));
    ScriptedLlmClient::new(move |_, _| {
        let next = queue.lock().unwrap().pop_front();
        Ok(next.map_or_else(|| text_response("All set."), |reply| reply.response()))
    })
}

fn executor(replies: Vec<Reply>) -> WorkflowExecutor<ScriptedLlmClient, MockToolExecutor> {
    let tools = MockToolExecutor::new()
        .with_tool(
            "update_seat",
            ToolOutput::success("Seat updated to 14C")
                .with_context_update(ContextUpdate::SeatNumber("14C".into())),
        )
        .with_tool("flight_status", ToolOutput::error("Invalid input: expected a string"));
    WorkflowExecutor::new(scripted(replies), tools, ExecutorConfig::default())
}

fn run_conversation(turns: &[String], replies: Vec<Reply>) -> Vec<ConversationRecord> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async {
        let executor = executor(replies);
        let mut record = None;
        let mut snapshots = Vec::new();
        for message in turns {
            let next = executor.process_turn(message, record.take()).await.unwrap();
            snapshots.push(next.clone());
            record = Some(next);
        }
        snapshots
    })
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_agent() -> impl Strategy<Value = AgentName> {
    prop::sample::select(AgentName::ALL.to_vec())
}

fn arb_specialist() -> impl Strategy<Value = AgentName> {
    prop::sample::select(AgentName::SPECIALISTS.to_vec())
}

fn arb_reply() -> impl Strategy<Value = Reply> {
    prop_oneof![
        3 => "[a-zA-Z ,.]{1,40}".prop_map(Reply::Plain),
        3 => arb_specialist().prop_map(Reply::Route),
        2 => Just(Reply::Handoff),
        1 => Just(Reply::SeatUpdate),
        1 => Just(Reply::BrokenTool),
    ]
}

fn arb_turns() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z ?]{1,30}", 1..6)
}

fn arb_record() -> impl Strategy<Value = ConversationRecord> {
    (
        0usize..4,
        prop::option::of(arb_specialist()),
        prop::option::of(prop_oneof![Just(String::new()), Just("cannot_handle_request".to_string())]),
        arb_agent(),
    )
        .prop_map(|(user_turns, last_active, handoff_reason, current)| {
            let mut record = ConversationRecord::new(AirlineContext::default());
            for i in 0..user_turns {
                record.messages.push(Message::user(format!("question {i}")));
                record
                    .messages
                    .push(Message::assistant(current, format!("answer {i}"), vec![]));
            }
            record.current_agent = current;
            record.last_active_agent = last_active;
            record.handoff_reason = handoff_reason;
            record
        })
}

// ============================================================================
// Cross-turn invariants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_history_is_append_only(
        turns in arb_turns(),
        replies in prop::collection::vec(arb_reply(), 0..30),
    ) {
        let snapshots = run_conversation(&turns, replies);

        for pair in snapshots.windows(2) {
            let (before, after) = (&pair[0], &pair[1]);
            prop_assert!(after.messages.len() > before.messages.len());
            prop_assert_eq!(&after.messages[..before.messages.len()], &before.messages[..]);
            prop_assert_eq!(&after.events[..before.events.len()], &before.events[..]);
            prop_assert_eq!(
                &after.routing_history[..before.routing_history.len()],
                &before.routing_history[..]
            );
        }
    }

    #[test]
    fn prop_context_identity_is_stable(
        turns in arb_turns(),
        replies in prop::collection::vec(arb_reply(), 0..30),
    ) {
        let snapshots = run_conversation(&turns, replies);
        let account = snapshots[0].context.account_number.clone();
        prop_assert!(account.is_some());

        let mut confirmation: Option<String> = None;
        let mut flight: Option<String> = None;
        for record in &snapshots {
            prop_assert_eq!(&record.context.account_number, &account);
            if let Some(seen) = &confirmation {
                prop_assert_eq!(record.context.confirmation_number.as_ref(), Some(seen));
            }
            if let Some(seen) = &flight {
                prop_assert_eq!(record.context.flight_number.as_ref(), Some(seen));
            }
            confirmation.clone_from(&record.context.confirmation_number);
            flight.clone_from(&record.context.flight_number);
        }
    }

    #[test]
    fn prop_turn_outcome_is_consistent(
        turns in arb_turns(),
        replies in prop::collection::vec(arb_reply(), 0..30),
    ) {
        let snapshots = run_conversation(&turns, replies);

        for record in &snapshots {
            // Every node run leaves exactly one agent_response event
            let responses = record
                .events
                .iter()
                .filter(|e| matches!(e, AgentEvent::AgentResponse { .. }))
                .count();
            prop_assert_eq!(responses, record.routing_history.len());

            prop_assert!(record.last_active_agent.map_or(true, AgentName::is_specialist));
            if record.handoff_reason.is_none() && record.current_agent.is_specialist() {
                prop_assert_eq!(record.last_active_agent, Some(record.current_agent));
            }
        }
    }

    #[test]
    fn prop_pending_handoff_reenters_at_triage(
        turns in arb_turns(),
        replies in prop::collection::vec(arb_reply(), 0..30),
        next_message in "[a-z ]{1,20}",
    ) {
        let snapshots = run_conversation(&turns, replies);
        let last = snapshots.last().unwrap().clone();
        let pending = last.handoff_reason.as_deref().is_some_and(|r| !r.is_empty());

        let state = ConversationState::begin_turn(last, next_message);
        if pending {
            prop_assert_eq!(resolve_entry(&state), AgentName::Triage);
        }
    }
}

// ============================================================================
// Entry resolution
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_entry_is_triage_or_last_active(record in arb_record(), message in "[a-z]{1,10}") {
        let last_active = record.last_active_agent;
        let state = ConversationState::begin_turn(record, message);
        let entry = resolve_entry(&state);

        prop_assert!(entry == AgentName::Triage || Some(entry) == last_active);
    }

    #[test]
    fn prop_entry_rules(record in arb_record(), message in "[a-z]{1,10}") {
        let state = ConversationState::begin_turn(record, message);
        let entry = resolve_entry(&state);
        let pending = state.handoff_reason.as_deref().is_some_and(|r| !r.is_empty());

        if state.messages.len() <= 1 || pending {
            prop_assert_eq!(entry, AgentName::Triage);
        } else if let Some(agent) = state.last_active_agent {
            prop_assert_eq!(entry, agent);
        } else {
            prop_assert_eq!(entry, AgentName::Triage);
        }
    }

    #[test]
    fn prop_entry_is_deterministic(record in arb_record(), message in "[a-z]{1,10}") {
        let a = ConversationState::begin_turn(record.clone(), message.clone());
        let b = ConversationState::begin_turn(record, message);
        prop_assert_eq!(resolve_entry(&a), resolve_entry(&b));
    }
}

// ============================================================================
// Reply interpretation
// ============================================================================

proptest! {
    #[test]
    fn prop_text_without_markers_routes_nowhere(text in "[a-z ]{0,60}") {
        prop_assert_eq!(interpret_triage_reply(&text), RoutingDecision::NoRoute);
        prop_assert_eq!(interpret_specialist_reply(&text), RoutingDecision::NoRoute);
    }

    #[test]
    fn prop_single_marker_delegates(
        prefix in "[a-z ]{0,30}",
        suffix in "[a-z ]{0,30}",
        agent in arb_specialist(),
    ) {
        let marker = agent.route_marker().unwrap();
        let reply = format!("{prefix}{marker}{suffix}");
        prop_assert_eq!(interpret_triage_reply(&reply), RoutingDecision::Delegate(agent));
    }

    #[test]
    fn prop_handoff_marker_anywhere(prefix in "[a-zA-Z ]{0,30}", suffix in "[a-zA-Z ]{0,30}") {
        let reply = format!("{prefix}HANDOFF_TO_TRIAGE{suffix}");
        prop_assert_eq!(interpret_specialist_reply(&reply), RoutingDecision::Handoff);
    }
}
