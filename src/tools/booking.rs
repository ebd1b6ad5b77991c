//! Flight status and cancellation

use super::{parse_input, ConfirmationInput, Tool, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct FlightStatusTool;

#[derive(Debug, Deserialize)]
struct FlightStatusInput {
    flight_number: String,
}

#[async_trait]
impl Tool for FlightStatusTool {
    fn name(&self) -> &'static str {
        "flight_status"
    }

    fn description(&self) -> String {
        "Look up the current status and departure gate of a flight.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["flight_number"],
            "properties": {
                "flight_number": {
                    "type": "string",
                    "description": "Flight number, e.g. FLT-123"
                }
            }
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        match parse_input::<FlightStatusInput>(input) {
            Ok(input) => ToolOutput::success(format!(
                "Flight {} is on time and departs from gate A10.",
                input.flight_number
            )),
            Err(out) => out,
        }
    }
}

pub struct CancelFlightTool;

#[async_trait]
impl Tool for CancelFlightTool {
    fn name(&self) -> &'static str {
        "cancel_flight"
    }

    fn description(&self) -> String {
        "Cancel the booking identified by a confirmation number.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["confirmation_number"],
            "properties": {
                "confirmation_number": {
                    "type": "string",
                    "description": "Booking confirmation number"
                }
            }
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        match parse_input::<ConfirmationInput>(input) {
            Ok(input) => ToolOutput::success(format!(
                "Booking {} has been cancelled.",
                input.confirmation_number
            )),
            Err(out) => out,
        }
    }
}
