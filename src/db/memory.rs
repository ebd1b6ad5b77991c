//! In-process conversation store

use crate::runtime::ConversationStore;
use crate::state_machine::ConversationRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Conversations kept in a map for the life of the process
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, ConversationRecord>>,
    /// Ids in first-save order
    order: RwLock<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn get(&self, conv_id: &str) -> Result<Option<ConversationRecord>, String> {
        Ok(self.records.read().await.get(conv_id).cloned())
    }

    async fn save(&self, conv_id: &str, record: &ConversationRecord) -> Result<(), String> {
        let previous = self
            .records
            .write()
            .await
            .insert(conv_id.to_string(), record.clone());
        if previous.is_none() {
            self.order.write().await.push(conv_id.to_string());
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, String> {
        Ok(self.order.read().await.clone())
    }
}
