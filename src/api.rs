//! HTTP API
//!
//! Thin transport around [`crate::agent::Agent`]: API-key check, per-IP
//! rate limiting and session selection.

mod handlers;
mod rate_limit;
mod types;

pub use handlers::create_router;
pub use rate_limit::RateLimiter;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::agent::Agent;
use crate::config::AppConfig;
use crate::db::Database;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Agent>,
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(agent: Agent, db: Database, config: AppConfig) -> Self {
        Self {
            agent: Arc::new(agent),
            db,
            limiter: Arc::new(RateLimiter::per_minute(config.rate_limit)),
            config: Arc::new(config),
        }
    }
}
