//! Conversation persistence
//!
//! SQLite for durable deployments, an in-process map otherwise.

mod memory;
mod schema;

pub use memory::MemoryStore;
use schema::SCHEMA;

use crate::state_machine::ConversationRecord;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Corrupt conversation {id}: {source}")]
    Corrupt {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to create database directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path, creating parent directories
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> DbResult<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn conn(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    fn run_migrations(&self) -> DbResult<()> {
        self.conn()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Conversation Operations ====================

    /// Insert a conversation or replace its state, keeping `created_at`
    pub fn upsert_conversation(&self, id: &str, record: &ConversationRecord) -> DbResult<()> {
        let state = serde_json::to_string(record)?;
        let now = Utc::now().to_rfc3339();
        let message_count = i64::try_from(record.messages.len()).unwrap_or(i64::MAX);

        self.conn()?.execute(
            "INSERT INTO conversations (id, state, current_agent, message_count, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT(id) DO UPDATE SET
                state = excluded.state,
                current_agent = excluded.current_agent,
                message_count = excluded.message_count,
                updated_at = excluded.updated_at",
            params![id, state, record.current_agent.as_str(), message_count, now],
        )?;
        Ok(())
    }

    /// Get conversation by ID, `None` if absent
    pub fn get_conversation(&self, id: &str) -> DbResult<Option<ConversationRecord>> {
        let state: Option<String> = self
            .conn()?
            .query_row(
                "SELECT state FROM conversations WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        state
            .map(|state| {
                serde_json::from_str(&state).map_err(|source| DbError::Corrupt {
                    id: id.to_string(),
                    source,
                })
            })
            .transpose()
    }

    /// All conversation ids, oldest first
    pub fn list_conversation_ids(&self) -> DbResult<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id FROM conversations ORDER BY created_at, rowid")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }
}
