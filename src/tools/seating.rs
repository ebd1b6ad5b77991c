//! Seat changes and the interactive seat map

use super::{parse_input, Tool, ToolOutput};
use crate::state_machine::ContextUpdate;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

/// Output of `display_seat_map`; clients render a seat picker when they see it
pub const DISPLAY_SEAT_MAP: &str = "DISPLAY_SEAT_MAP";

pub struct UpdateSeatTool;

#[derive(Debug, Deserialize)]
struct UpdateSeatInput {
    confirmation_number: String,
    new_seat: String,
}

#[async_trait]
impl Tool for UpdateSeatTool {
    fn name(&self) -> &'static str {
        "update_seat"
    }

    fn description(&self) -> String {
        "Change the seat assigned to a booking.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["confirmation_number", "new_seat"],
            "properties": {
                "confirmation_number": {
                    "type": "string",
                    "description": "Booking confirmation number"
                },
                "new_seat": {
                    "type": "string",
                    "description": "Requested seat, e.g. 12A"
                }
            }
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        let input: UpdateSeatInput = match parse_input(input) {
            Ok(i) => i,
            Err(out) => return out,
        };
        let seat = input.new_seat.trim().to_uppercase();
        if seat.is_empty() {
            return ToolOutput::error("new_seat must not be empty");
        }
        ToolOutput::success(format!(
            "Seat changed to {seat} for confirmation number {}",
            input.confirmation_number
        ))
        .with_context_update(ContextUpdate::SeatNumber(seat))
    }
}

pub struct DisplaySeatMapTool;

#[async_trait]
impl Tool for DisplaySeatMapTool {
    fn name(&self) -> &'static str {
        "display_seat_map"
    }

    fn description(&self) -> String {
        "Show the customer an interactive seat map so they can pick a seat.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn run(&self, _input: Value) -> ToolOutput {
        ToolOutput::success(DISPLAY_SEAT_MAP)
    }
}
