//! Conversation memory
//!
//! Remembers the last country a conversation resolved so follow-ups like
//! "and its capital?" can refer back to it. One value per conversation,
//! overwritten on every successful country answer.

use std::sync::RwLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("conversation store unavailable: {0}")]
    Store(String),
    #[error("conversation memory lock poisoned")]
    Poisoned,
}

/// Storage for the last referenced country of one conversation
pub trait ConversationMemory: Send + Sync {
    /// The remembered country, if any
    fn last_country(&self) -> Result<Option<String>, MemoryError>;

    /// Replace the remembered country
    fn remember_country(&self, country: &str) -> Result<(), MemoryError>;
}

/// A single in-process slot.
///
/// Concurrent callers sharing one slot race; the last write wins. Use one
/// slot per conversation (or the database-backed sessions) to avoid it.
#[allow(dead_code)] // Used in tests
#[derive(Debug, Default)]
pub struct SharedSlot {
    country: RwLock<Option<String>>,
}

#[allow(dead_code)] // Used in tests
impl SharedSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot that already remembers `country`
    pub fn with_country(country: &str) -> Self {
        Self {
            country: RwLock::new(Some(country.to_string())),
        }
    }
}

impl ConversationMemory for SharedSlot {
    fn last_country(&self) -> Result<Option<String>, MemoryError> {
        let guard = self.country.read().map_err(|_| MemoryError::Poisoned)?;
        Ok(guard.clone())
    }

    fn remember_country(&self, country: &str) -> Result<(), MemoryError> {
        let mut guard = self.country.write().map_err(|_| MemoryError::Poisoned)?;
        *guard = Some(country.to_string());
        Ok(())
    }
}
