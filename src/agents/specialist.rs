//! Specialist nodes: answer within competence or hand back to triage

use super::prompts::specialist_prompt;
use crate::llm::{LlmError, LlmRequest, LlmResponse};
use crate::runtime::{LlmClient, ToolExecutor};
use crate::state_machine::routing::CANNOT_HANDLE_REASON;
use crate::state_machine::{
    interpret_specialist_reply, AgentEvent, AgentName, ConversationState, Message,
    RoutingDecision, ToolCall,
};

/// What distinguishes one specialist from another
#[derive(Debug)]
pub struct SpecialistProfile {
    pub agent: AgentName,
    pub title: &'static str,
    pub description: &'static str,
    /// One-line summary triage uses when choosing this specialist
    pub routing_hint: &'static str,
    pub can_handle: &'static [&'static str],
    pub cannot_handle: &'static [&'static str],
    /// Generate confirmation and flight numbers before prompting
    pub needs_booking_refs: bool,
}

static SEAT_BOOKING: SpecialistProfile = SpecialistProfile {
    agent: AgentName::SeatBooking,
    title: "seat booking",
    description: "Handles seat changes and assignments",
    routing_hint: "seat changes, seat selection, seat upgrades",
    can_handle: &[
        "Changing or choosing a seat, including preferences such as window or aisle",
        "Showing the seat map",
        "Questions about the customer's current seat",
        "Seat upgrades",
    ],
    cannot_handle: &[
        "Flight status, delays, gates or departure times",
        "Cancellations and refunds",
        "Baggage and general policy questions",
        "Any other account change",
    ],
    needs_booking_refs: true,
};

static FLIGHT_STATUS: SpecialistProfile = SpecialistProfile {
    agent: AgentName::FlightStatus,
    title: "flight status",
    description: "Provides flight status information",
    routing_hint: "flight status, gate information, delays",
    can_handle: &[
        "Whether a flight is on time or delayed",
        "Gate and departure time information",
        "Schedule questions for a specific flight",
    ],
    cannot_handle: &[
        "Seat changes or seat maps",
        "Cancellations and refunds",
        "Baggage and general policy questions",
    ],
    needs_booking_refs: false,
};

static CANCELLATION: SpecialistProfile = SpecialistProfile {
    agent: AgentName::Cancellation,
    title: "cancellation",
    description: "Processes flight cancellations",
    routing_hint: "flight cancellations, refunds",
    can_handle: &[
        "Cancelling a booking",
        "Refund questions about a cancelled booking",
    ],
    cannot_handle: &[
        "Seat changes or seat maps",
        "Flight status, delays or gates",
        "Baggage and general policy questions",
    ],
    needs_booking_refs: true,
};

static FAQ: SpecialistProfile = SpecialistProfile {
    agent: AgentName::Faq,
    title: "frequently asked questions",
    description: "Answers general questions about policies and procedures",
    routing_hint: "general questions about policies, baggage, amenities",
    can_handle: &[
        "Baggage allowance and fees",
        "Onboard amenities such as wifi",
        "Aircraft layout and general policies",
    ],
    cannot_handle: &[
        "Changing a seat on a specific booking",
        "Live status of a specific flight",
        "Cancelling a booking",
    ],
    needs_booking_refs: false,
};

/// Profile for a specialist, `None` for triage
pub fn profile(agent: AgentName) -> Option<&'static SpecialistProfile> {
    match agent {
        AgentName::Triage => None,
        AgentName::SeatBooking => Some(&SEAT_BOOKING),
        AgentName::FlightStatus => Some(&FLIGHT_STATUS),
        AgentName::Cancellation => Some(&CANCELLATION),
        AgentName::Faq => Some(&FAQ),
    }
}

pub(super) async fn run<L, T>(
    profile: &SpecialistProfile,
    mut state: ConversationState,
    llm: &L,
    tools: &T,
) -> Result<ConversationState, LlmError>
where
    L: LlmClient + ?Sized,
    T: ToolExecutor + ?Sized,
{
    let agent = profile.agent;

    if profile.needs_booking_refs && state.context.ensure_booking_refs(&mut rand::thread_rng()) {
        tracing::debug!(%agent, "Generated booking references");
    }

    let request = LlmRequest {
        agent,
        system: specialist_prompt(profile, &state.context),
        messages: state.messages.clone(),
        tools: tools.definitions(agent),
    };

    let LlmResponse {
        text: reply,
        tool_calls: calls,
        ..
    } = llm.complete(&request).await?;
    let decision = interpret_specialist_reply(&reply);

    match decision {
        RoutingDecision::Handoff => {
            tracing::info!(%agent, "Handing back to triage");
            state.handoff_reason = Some(CANNOT_HANDLE_REASON.to_string());
        }
        _ => {
            tracing::info!(%agent, "Handling request");
            state.handoff_reason = None;
        }
    }
    state.next_agent = decision.next();

    state
        .messages
        .push(Message::assistant(agent, reply, calls.clone()));

    for call in calls {
        run_tool(agent, call, &mut state, tools).await;
    }

    state.events.push(AgentEvent::AgentResponse { agent });
    state.routing_history.push(agent);
    state.last_active_agent = Some(agent);
    state.current_agent = agent;

    Ok(state)
}

/// Execute one tool call. Failures are folded into the transcript.
async fn run_tool<T: ToolExecutor + ?Sized>(
    agent: AgentName,
    call: ToolCall,
    state: &mut ConversationState,
    tools: &T,
) {
    let outcome = tools
        .execute(agent, &call.name, call.arguments.clone())
        .await
        .ok_or_else(|| format!("unknown tool: {}", call.name))
        .and_then(|output| {
            if output.success {
                Ok(output)
            } else {
                Err(output.output)
            }
        });

    match outcome {
        Ok(output) => {
            tracing::info!(%agent, tool = %call.name, "Tool succeeded");
            if let Some(update) = output.context_update {
                state.context.apply(update);
            }
            state
                .messages
                .push(Message::tool_result(&call.id, &output.output, false));
            state.events.push(AgentEvent::ToolCall {
                agent,
                tool: call.name,
                args: call.arguments,
                result: output.output,
            });
        }
        Err(error) => {
            tracing::warn!(%agent, tool = %call.name, %error, "Tool failed");
            state.messages.push(Message::tool_result(
                &call.id,
                format!("Tool error: {error}"),
                true,
            ));
            state.events.push(AgentEvent::ToolError {
                agent,
                tool: call.name,
                error,
            });
        }
    }
}
