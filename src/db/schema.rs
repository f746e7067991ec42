//! Database schema

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS conversation_memory (
    session_id TEXT PRIMARY KEY,
    last_country TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_conversation_memory_updated
    ON conversation_memory(updated_at DESC);
";

/// Session used when a caller does not name one
pub const DEFAULT_SESSION: &str = "default";
