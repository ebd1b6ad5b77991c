//! System prompts for each agent

use super::specialist::SpecialistProfile;
use crate::state_machine::routing::HANDOFF_MARKER;
use crate::state_machine::{AgentName, AirlineContext};
use std::fmt::Write;

const NOT_PROVIDED: &str = "Not provided";

fn or_not_provided(value: Option<&String>) -> &str {
    value.map_or(NOT_PROVIDED, String::as_str)
}

pub fn triage_prompt(context: &AirlineContext) -> String {
    let mut prompt = String::from(
        "You are the first point of contact for airline customer service.\n\n\
         Work out which department should handle the customer's request and include \
         exactly one of these routing codes in your reply:\n",
    );
    for agent in AgentName::SPECIALISTS {
        if let (Some(marker), Some(profile)) = (agent.route_marker(), super::profile(agent)) {
            let _ = writeln!(prompt, "- {marker}: {}", profile.routing_hint);
        }
    }
    let _ = write!(
        prompt,
        "\nReply helpfully to the customer and include the routing code in the same reply.\n\n\
         Customer context:\n\
         - Account: {}\n\
         - Confirmation: {}\n\
         - Flight: {}\n",
        or_not_provided(context.account_number.as_ref()),
        or_not_provided(context.confirmation_number.as_ref()),
        or_not_provided(context.flight_number.as_ref()),
    );
    prompt
}

pub fn specialist_prompt(profile: &SpecialistProfile, context: &AirlineContext) -> String {
    let mut prompt = format!(
        "You are the airline's {} specialist.\n\n\
         Customer information:\n\
         - Confirmation number: {}\n\
         - Flight number: {}\n\
         - Seat: {}\n\n\
         The conversation may have been transferred to you from another agent. \
         Answer the most recent customer message directly; never ask the customer \
         to repeat themselves.\n\n\
         Requests you handle:\n",
        profile.title,
        or_not_provided(context.confirmation_number.as_ref()),
        or_not_provided(context.flight_number.as_ref()),
        context.seat_number.as_deref().unwrap_or("Not assigned"),
    );
    for item in profile.can_handle {
        let _ = writeln!(prompt, "- {item}");
    }
    prompt.push_str("\nRequests you must NOT handle:\n");
    for item in profile.cannot_handle {
        let _ = writeln!(prompt, "- {item}");
    }
    let _ = write!(
        prompt,
        "\nIf the latest request is outside your area, tell the customer you will transfer \
         them to the right team and include {HANDOFF_MARKER} in your reply. \
         Otherwise always answer, using your tools where they help:\n"
    );
    for tool in profile.agent.tool_names() {
        let _ = writeln!(prompt, "- {tool}");
    }
    prompt
}
