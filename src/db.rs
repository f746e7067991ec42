//! Database module
//!
//! Persists the last referenced country of every conversation session.

mod schema;

pub use schema::DEFAULT_SESSION;
use schema::SCHEMA;

use crate::memory::{ConversationMemory, MemoryError};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Database lock poisoned")]
    Poisoned,
}

pub type DbResult<T> = Result<T, DbError>;

impl From<DbError> for MemoryError {
    fn from(e: DbError) -> Self {
        MemoryError::Store(e.to_string())
    }
}

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Session Operations ====================

    /// Register a new, empty session. Existing sessions are left untouched.
    pub fn create_session(&self, session_id: &str) -> DbResult<()> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT OR IGNORE INTO conversation_memory (session_id, last_country, created_at, updated_at)
             VALUES (?1, NULL, ?2, ?2)",
            params![session_id, now],
        )?;
        Ok(())
    }

    /// Last country remembered for a session; `None` for unknown sessions
    pub fn get_last_country(&self, session_id: &str) -> DbResult<Option<String>> {
        let conn = self.lock()?;
        let country: Option<Option<String>> = conn
            .query_row(
                "SELECT last_country FROM conversation_memory WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(country.flatten())
    }

    /// Overwrite the remembered country, creating the session if needed
    pub fn set_last_country(&self, session_id: &str, country: &str) -> DbResult<()> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO conversation_memory (session_id, last_country, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(session_id) DO UPDATE SET last_country = ?2, updated_at = ?3",
            params![session_id, country, now],
        )?;
        Ok(())
    }

    /// Number of known sessions
    #[allow(dead_code)] // Used in tests
    pub fn session_count(&self) -> DbResult<usize> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM conversation_memory", [], |row| {
                row.get(0)
            })?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Conversation memory scoped to one session
    pub fn session(&self, session_id: impl Into<String>) -> SessionMemory {
        SessionMemory {
            db: self.clone(),
            session_id: session_id.into(),
        }
    }
}

/// Database-backed memory for a single session
#[derive(Clone)]
pub struct SessionMemory {
    db: Database,
    session_id: String,
}

impl SessionMemory {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl ConversationMemory for SessionMemory {
    fn last_country(&self) -> Result<Option<String>, MemoryError> {
        Ok(self.db.get_last_country(&self.session_id)?)
    }

    fn remember_country(&self, country: &str) -> Result<(), MemoryError> {
        Ok(self.db.set_last_country(&self.session_id, country)?)
    }
}
