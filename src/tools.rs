//! Domain tools available to the specialist agents
//!
//! Tools are stateless singletons. Each agent may only invoke the tools bound
//! to it by [`AgentName::tool_names`]; anything else is reported as unknown.

mod booking;
mod faq;
mod seating;

pub use booking::{CancelFlightTool, FlightStatusTool};
pub use faq::{BaggageLookupTool, FaqLookupTool};
pub use seating::{DisplaySeatMapTool, UpdateSeatTool, DISPLAY_SEAT_MAP};

use crate::llm::ToolDefinition;
use crate::runtime::ToolExecutor;
use crate::state_machine::{AgentName, ContextUpdate};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Default per-call tool deadline
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(10);

/// Result from tool execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_update: Option<ContextUpdate>,
}

impl ToolOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            context_update: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
            context_update: None,
        }
    }

    pub fn with_context_update(mut self, update: ContextUpdate) -> Self {
        self.context_update = Some(update);
        self
    }
}

/// Trait for tools that can be invoked by an agent
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// Tool description for the model
    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    async fn run(&self, input: Value) -> ToolOutput;
}

/// Deserialize tool input, mapping failures to an error output
pub(crate) fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T, ToolOutput> {
    serde_json::from_value(input).map_err(|e| ToolOutput::error(format!("Invalid input: {e}")))
}

/// Collection of tools shared by all conversations
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    timeout: Duration,
}

impl ToolRegistry {
    /// Registry with every airline tool
    pub fn standard() -> Self {
        Self::with_tools(
            vec![
                Arc::new(FaqLookupTool),
                Arc::new(BaggageLookupTool),
                Arc::new(UpdateSeatTool),
                Arc::new(DisplaySeatMapTool),
                Arc::new(FlightStatusTool),
                Arc::new(CancelFlightTool),
            ],
            DEFAULT_TOOL_TIMEOUT,
        )
    }

    pub fn with_tools(tools: Vec<Arc<dyn Tool>>, timeout: Duration) -> Self {
        Self { tools, timeout }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn bound(&self, agent: AgentName, name: &str) -> Option<&Arc<dyn Tool>> {
        if !agent.tool_names().iter().any(|bound| *bound == name) {
            return None;
        }
        self.tools.iter().find(|t| t.name() == name)
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    async fn execute(&self, agent: AgentName, name: &str, input: Value) -> Option<ToolOutput> {
        let tool = self.bound(agent, name)?;
        match tokio::time::timeout(self.timeout, tool.run(input)).await {
            Ok(output) => Some(output),
            Err(_) => {
                tracing::warn!(%agent, tool = name, timeout_ms = %self.timeout.as_millis(), "Tool timed out");
                Some(ToolOutput::error(format!(
                    "timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }

    fn definitions(&self, agent: AgentName) -> Vec<ToolDefinition> {
        agent
            .tool_names()
            .iter()
            .filter_map(|name| self.tools.iter().find(|t| t.name() == *name))
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }
}

/// Input carrying only a confirmation number
#[derive(Debug, Deserialize)]
pub(crate) struct ConfirmationInput {
    pub confirmation_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct SlowTool;

    #[async_trait]
    impl Tool for SlowTool {
        fn name(&self) -> &'static str {
            "flight_status"
        }

        fn description(&self) -> String {
            "never finishes in time".to_string()
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }

        async fn run(&self, _input: Value) -> ToolOutput {
            tokio::time::sleep(Duration::from_secs(60)).await;
            ToolOutput::success("too late")
        }
    }

    #[test]
    fn test_definitions_scoped_per_agent() {
        let registry = ToolRegistry::standard();
        for agent in AgentName::ALL {
            let names: Vec<_> = registry
                .definitions(agent)
                .into_iter()
                .map(|d| d.name)
                .collect();
            assert_eq!(names, agent.tool_names(), "{agent}");
        }
    }

    #[tokio::test]
    async fn test_tool_bound_to_other_agent_is_unknown() {
        let registry = ToolRegistry::standard();
        let out = registry
            .execute(AgentName::Faq, "cancel_flight", json!({"confirmation_number": "ABC123"}))
            .await;
        assert!(out.is_none());
        assert!(registry
            .execute(AgentName::Faq, "book_hotel", json!({}))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_bound_tool_runs() {
        let registry = ToolRegistry::standard();
        let out = registry
            .execute(AgentName::FlightStatus, "flight_status", json!({"flight_number": "FLT-100"}))
            .await
            .unwrap();
        assert!(out.success);
        assert!(out.output.contains("FLT-100"));
    }

    #[tokio::test]
    async fn test_timeout_becomes_error_output() {
        let registry = ToolRegistry::with_tools(vec![Arc::new(SlowTool)], Duration::from_millis(20));
        let out = registry
            .execute(AgentName::FlightStatus, "flight_status", json!({}))
            .await
            .unwrap();
        assert!(!out.success);
        assert!(out.output.contains("timed out"));
    }
}
