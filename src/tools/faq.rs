//! Frequently asked questions and baggage policy lookups

use super::{parse_input, Tool, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct FaqLookupTool;

#[derive(Debug, Deserialize)]
struct FaqInput {
    question: String,
}

fn answer_faq(question: &str) -> &'static str {
    let q = question.to_lowercase();
    if q.contains("bag") {
        "Each passenger may bring one bag on board. It must weigh under 50 pounds \
         and measure no more than 22 x 14 x 9 inches."
    } else if q.contains("seats") || q.contains("plane") {
        "The aircraft has 120 seats: 22 business class and 98 economy. \
         Exit rows are 4 and 16, and rows 5 to 8 are Economy Plus with extra legroom."
    } else if q.contains("wifi") {
        "Wifi is free on board. Connect to the Airline-Wifi network."
    } else {
        "I'm sorry, I don't know the answer to that question."
    }
}

#[async_trait]
impl Tool for FaqLookupTool {
    fn name(&self) -> &'static str {
        "faq_lookup"
    }

    fn description(&self) -> String {
        "Look up answers to common questions about baggage, the aircraft and its seats, and onboard wifi.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["question"],
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The customer's question"
                }
            }
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        match parse_input::<FaqInput>(input) {
            Ok(input) => ToolOutput::success(answer_faq(&input.question)),
            Err(out) => out,
        }
    }
}

pub struct BaggageLookupTool;

#[derive(Debug, Deserialize)]
struct BaggageInput {
    query: String,
}

#[async_trait]
impl Tool for BaggageLookupTool {
    fn name(&self) -> &'static str {
        "baggage_lookup"
    }

    fn description(&self) -> String {
        "Look up baggage allowance and fees.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["query"],
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What the customer wants to know, e.g. fees or allowance"
                }
            }
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        let input: BaggageInput = match parse_input(input) {
            Ok(i) => i,
            Err(out) => return out,
        };
        let q = input.query.to_lowercase();
        let answer = if q.contains("fee") {
            "The overweight bag fee is $75."
        } else if q.contains("allowance") {
            "One carry-on and one checked bag (up to 50 lbs) are included."
        } else {
            "Could you give me more details about your baggage question?"
        };
        ToolOutput::success(answer)
    }
}
