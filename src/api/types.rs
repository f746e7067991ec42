//! API request and response types

use crate::agent::ResolvedIntent;
use serde::{Deserialize, Serialize};

/// Query string of `/ask`
#[derive(Debug, Deserialize)]
pub struct AskQuery {
    #[serde(default)]
    pub question: String,
    /// Conversation to read and update; the shared default when absent
    pub session: Option<String>,
}

/// Response for `/ask`
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub response: String,
    pub status: &'static str,
    pub session: String,
    pub intent: ResolvedIntent,
}

/// Response for `/sessions`
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: String,
}

/// Response for `/ping`
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub message: &'static str,
    pub status: &'static str,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
