//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::db::Database;
use crate::llm::{LlmError, LlmRequest, LlmResponse, ModelRegistry, ToolDefinition};
use crate::state_machine::{AgentName, ConversationRecord};
use crate::tools::ToolOutput;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Keyed storage for conversation records
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Load a conversation, `None` if the id is unknown
    async fn get(&self, conv_id: &str) -> Result<Option<ConversationRecord>, String>;

    /// Insert or replace a conversation
    async fn save(&self, conv_id: &str, record: &ConversationRecord) -> Result<(), String>;

    /// All known conversation ids
    async fn list(&self) -> Result<Vec<String>, String>;
}

/// Client for making model requests
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    fn model_id(&self) -> &str;
}

/// Executor for the tools bound to each agent
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute a tool on behalf of `agent`.
    ///
    /// Returns `None` when the tool does not exist or is not bound to `agent`.
    async fn execute(&self, agent: AgentName, name: &str, input: Value) -> Option<ToolOutput>;

    /// Tool definitions offered to the model for `agent`
    fn definitions(&self, agent: AgentName) -> Vec<ToolDefinition>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: ConversationStore + ?Sized> ConversationStore for Arc<T> {
    async fn get(&self, conv_id: &str) -> Result<Option<ConversationRecord>, String> {
        (**self).get(conv_id).await
    }

    async fn save(&self, conv_id: &str, record: &ConversationRecord) -> Result<(), String> {
        (**self).save(conv_id, record).await
    }

    async fn list(&self) -> Result<Vec<String>, String> {
        (**self).list().await
    }
}

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for Arc<T> {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        (**self).complete(request).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

#[async_trait]
impl<T: ToolExecutor + ?Sized> ToolExecutor for Arc<T> {
    async fn execute(&self, agent: AgentName, name: &str, input: Value) -> Option<ToolOutput> {
        (**self).execute(agent, name, input).await
    }

    fn definitions(&self, agent: AgentName) -> Vec<ToolDefinition> {
        (**self).definitions(agent)
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use Database as a conversation store
#[derive(Clone)]
pub struct DatabaseStore {
    db: Database,
}

impl DatabaseStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ConversationStore for DatabaseStore {
    async fn get(&self, conv_id: &str) -> Result<Option<ConversationRecord>, String> {
        self.db
            .get_conversation(conv_id)
            .map_err(|e| e.to_string())
    }

    async fn save(&self, conv_id: &str, record: &ConversationRecord) -> Result<(), String> {
        self.db
            .upsert_conversation(conv_id, record)
            .map_err(|e| e.to_string())
    }

    async fn list(&self) -> Result<Vec<String>, String> {
        self.db.list_conversation_ids().map_err(|e| e.to_string())
    }
}

/// Adapter to use `ModelRegistry` as `LlmClient`
pub struct RegistryLlmClient {
    registry: Arc<ModelRegistry>,
    model_id: String,
}

impl RegistryLlmClient {
    pub fn new(registry: Arc<ModelRegistry>, model_id: String) -> Self {
        Self { registry, model_id }
    }
}

#[async_trait]
impl LlmClient for RegistryLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let llm = self
            .registry
            .get(&self.model_id)
            .or_else(|| self.registry.default())
            .ok_or_else(|| LlmError::auth("No language model configured"))?;
        llm.complete(request).await
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Retries retryable model failures with exponential backoff
pub struct RetryingLlmClient<L> {
    inner: L,
    max_attempts: u32,
    base_delay: Duration,
}

impl<L: LlmClient> RetryingLlmClient<L> {
    pub fn new(inner: L, max_attempts: u32) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_secs(1),
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

#[async_trait]
impl<L: LlmClient> LlmClient for RetryingLlmClient<L> {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let mut attempt = 1;
        loop {
            match self.inner.complete(request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = e.retry_after.unwrap_or_else(|| self.backoff(attempt));
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = %delay.as_millis(),
                        error = %e,
                        "Retrying model request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}
