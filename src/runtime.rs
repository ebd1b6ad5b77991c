//! Runtime for executing conversation turns
//!
//! The executor runs a single turn; the manager wraps it with storage and
//! per-conversation serialization.

mod executor;
pub mod graph;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{ExecutorConfig, TurnError, WorkflowExecutor};
pub use traits::*;

use crate::state_machine::{AirlineContext, ConversationRecord};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>;

/// Manager over shared trait objects, as held by the HTTP layer
pub type SharedManager =
    ConversationManager<Arc<dyn ConversationStore>, Arc<dyn LlmClient>, Arc<dyn ToolExecutor>>;

/// Outcome of one chat turn, with the lengths the client had already seen
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub conversation_id: String,
    pub record: ConversationRecord,
    pub previous_message_count: usize,
    pub previous_event_count: usize,
    pub previous_routing_len: usize,
}

/// Owns the store and executor, and serializes turns per conversation id
pub struct ConversationManager<S, L, T> {
    store: S,
    executor: WorkflowExecutor<L, T>,
    locks: LockMap,
}

/// Exclusive hold on one conversation id.
///
/// Dropping it releases the lock and removes the map entry once no other
/// turn is waiting on it.
struct TurnLock<'a> {
    conv_id: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a LockMap,
}

impl Drop for TurnLock<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(&self.conv_id)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            locks.remove(&self.conv_id);
        }
    }
}

#[cfg(test)]
impl<L, T> ConversationManager<crate::db::MemoryStore, L, T>
where
    L: LlmClient,
    T: ToolExecutor,
{
    /// Manager backed by an in-process map
    pub fn in_memory(executor: WorkflowExecutor<L, T>) -> Self {
        Self::new(crate::db::MemoryStore::new(), executor)
    }
}

impl<S, L, T> ConversationManager<S, L, T>
where
    S: ConversationStore,
    L: LlmClient,
    T: ToolExecutor,
{
    pub fn new(store: S, executor: WorkflowExecutor<L, T>) -> Self {
        Self {
            store,
            executor,
            locks: LockMap::default(),
        }
    }

    async fn lock(&self, conv_id: &str) -> TurnLock<'_> {
        let slot = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(conv_id.to_string()).or_default())
        };
        let mut lock = TurnLock {
            conv_id: conv_id.to_string(),
            guard: None,
            locks: &self.locks,
        };
        lock.guard = Some(slot.lock_owned().await);
        lock
    }

    /// Fresh id with its lock already held
    async fn new_slot(&self) -> (String, Option<ConversationRecord>, TurnLock<'_>) {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let lock = self.lock(&id).await;
        (id, None, lock)
    }

    #[cfg(test)]
    fn held_locks(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Process one message. A missing or unknown id starts a new conversation.
    ///
    /// The conversation's lock is held from load through save, so concurrent
    /// turns on one id run one after another.
    pub async fn chat(&self, conv_id: Option<&str>, message: &str) -> Result<ChatTurn, TurnError> {
        let (conversation_id, record, _lock) = match conv_id {
            Some(id) => {
                let lock = self.lock(id).await;
                match self.store.get(id).await.map_err(TurnError::Store)? {
                    Some(record) => (id.to_string(), Some(record), lock),
                    None => {
                        drop(lock);
                        self.new_slot().await
                    }
                }
            }
            None => self.new_slot().await,
        };

        let previous_message_count = record.as_ref().map_or(0, |r| r.messages.len());
        let previous_event_count = record.as_ref().map_or(0, |r| r.events.len());
        let previous_routing_len = record.as_ref().map_or(0, |r| r.routing_history.len());

        tracing::info!(
            conv_id = %conversation_id,
            new = record.is_none(),
            "Processing turn"
        );

        let record = self.executor.process_turn(message, record).await?;
        self.store
            .save(&conversation_id, &record)
            .await
            .map_err(TurnError::Store)?;

        tracing::info!(
            conv_id = %conversation_id,
            agent = %record.current_agent,
            routing = ?record.routing_history,
            "Turn complete"
        );

        Ok(ChatTurn {
            conversation_id,
            record,
            previous_message_count,
            previous_event_count,
            previous_routing_len,
        })
    }

    /// Create and persist an empty conversation without running any agent
    pub async fn init_conversation(&self) -> Result<(String, ConversationRecord), TurnError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let record =
            ConversationRecord::new(AirlineContext::for_new_conversation(&mut rand::thread_rng()));
        self.store
            .save(&id, &record)
            .await
            .map_err(TurnError::Store)?;
        tracing::info!(conv_id = %id, "Initialized conversation");
        Ok((id, record))
    }

    /// Whether `conv_id` names a stored conversation
    pub async fn exists(&self, conv_id: &str) -> Result<bool, TurnError> {
        let record = self.store.get(conv_id).await.map_err(TurnError::Store)?;
        Ok(record.is_some())
    }

    pub async fn list(&self) -> Result<Vec<String>, TurnError> {
        self.store.list().await.map_err(TurnError::Store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::runtime::testing::{text_response, MockToolExecutor, ScriptedLlmClient};
    use crate::state_machine::AgentName;
    use std::time::Duration;

    fn faq_script() -> ScriptedLlmClient {
        ScriptedLlmClient::new(|agent, _| {
            Ok(match agent {
                AgentName::Triage => text_response("ROUTE_TO_FAQ"),
                _ => text_response("Wifi is free."),
            })
        })
    }

    fn manager(llm: ScriptedLlmClient) -> ConversationManager<MemoryStore, ScriptedLlmClient, MockToolExecutor> {
        ConversationManager::in_memory(WorkflowExecutor::new(
            llm,
            MockToolExecutor::new(),
            ExecutorConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_new_conversation_is_saved() {
        let mgr = manager(faq_script());

        let turn = mgr.chat(None, "wifi?").await.unwrap();

        assert_eq!(turn.previous_message_count, 0);
        assert_eq!(mgr.list().await.unwrap(), vec![turn.conversation_id.clone()]);
        assert_eq!(turn.record.current_agent, AgentName::Faq);
    }

    #[tokio::test]
    async fn test_second_turn_reports_previous_lengths() {
        let mgr = manager(faq_script());

        let first = mgr.chat(None, "wifi?").await.unwrap();
        let second = mgr
            .chat(Some(&first.conversation_id), "and on long flights?")
            .await
            .unwrap();

        assert_eq!(second.conversation_id, first.conversation_id);
        assert_eq!(second.previous_message_count, first.record.messages.len());
        assert_eq!(second.previous_event_count, first.record.events.len());
        assert_eq!(second.previous_routing_len, first.record.routing_history.len());
        assert!(second.record.is_followup_message);
    }

    #[tokio::test]
    async fn test_unknown_id_starts_fresh_conversation() {
        let mgr = manager(faq_script());

        let turn = mgr.chat(Some("does-not-exist"), "hello").await.unwrap();

        assert_ne!(turn.conversation_id, "does-not-exist");
        assert!(!turn.record.is_followup_message);
    }

    #[tokio::test]
    async fn test_init_conversation_persists_empty_record() {
        let mgr = manager(faq_script());

        let (id, record) = mgr.init_conversation().await.unwrap();

        assert!(record.messages.is_empty());
        assert!(record.context.account_number.is_some());
        assert!(mgr.exists(&id).await.unwrap());

        let turn = mgr.chat(Some(&id), "wifi?").await.unwrap();
        assert_eq!(turn.conversation_id, id);
        assert_eq!(turn.record.context.account_number, record.context.account_number);
        assert!(!turn.record.is_followup_message);
    }

    #[tokio::test]
    async fn test_lock_entries_are_released_after_turns() {
        let mgr = manager(faq_script());

        for i in 0..50 {
            mgr.chat(Some(&format!("unknown-{i}")), "hi").await.unwrap();
        }
        let first = mgr.chat(None, "wifi?").await.unwrap();
        mgr.chat(Some(&first.conversation_id), "thanks").await.unwrap();

        assert_eq!(mgr.held_locks(), 0);
    }

    #[tokio::test]
    async fn test_failed_turn_releases_lock() {
        let mgr = manager(ScriptedLlmClient::new(|_, _| {
            Err(crate::llm::LlmError::auth("no key"))
        }));

        assert!(mgr.chat(None, "hi").await.is_err());
        assert_eq!(mgr.held_locks(), 0);
    }

    #[tokio::test]
    async fn test_failed_turn_persists_nothing() {
        let mgr = manager(ScriptedLlmClient::new(|_, _| {
            Err(crate::llm::LlmError::auth("no key"))
        }));
        let (id, _) = mgr.init_conversation().await.unwrap();

        assert!(mgr.chat(Some(&id), "hi").await.is_err());

        let stored = mgr.store.get(&id).await.unwrap().unwrap();
        assert!(stored.messages.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_turns_on_one_conversation_are_serialized() {
        let mgr = Arc::new(manager(faq_script().with_delay(Duration::from_millis(20))));
        let first = mgr.chat(None, "start").await.unwrap();
        let id = first.conversation_id.clone();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let mgr = Arc::clone(&mgr);
                let id = id.clone();
                tokio::spawn(async move { mgr.chat(Some(&id), &format!("message {i}")).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(mgr.held_locks(), 0);
        let stored = mgr.store.get(&id).await.unwrap().unwrap();
        let user_messages = stored.messages.iter().filter(|m| m.is_user()).count();
        // First turn: user + duplicate from triage. Each follow-up adds one.
        assert_eq!(user_messages, 2 + 4);
        assert_eq!(stored.routing_history.len(), 2 + 4);
    }
}
