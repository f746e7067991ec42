//! HTTP request handlers

use super::types::{AskQuery, AskResponse, ErrorResponse, PingResponse, SessionResponse};
use super::AppState;
use crate::config::AppConfig;
use crate::db::DEFAULT_SESSION;
use axum::{
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;

const API_KEY_HEADER: &str = "x-api-key";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/ping", get(ping))
        // Question answering
        .route("/ask", get(ask))
        // Fresh conversation context
        .route("/sessions", post(create_session))
        // Non-sensitive configuration
        .route("/config", get(get_config))
        .with_state(state)
}

async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: "pong",
        status: "healthy",
    })
}

// ============================================================
// Question Answering
// ============================================================

async fn ask(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(query): Query<AskQuery>,
) -> Result<Json<AskResponse>, AppError> {
    verify_api_key(&headers, &state.config)?;

    if !state.limiter.check(client.ip()) {
        tracing::warn!(client = %client.ip(), "Rate limit exceeded");
        return Err(AppError::TooManyRequests);
    }

    let question = query.question.trim();
    if question.is_empty() {
        return Err(AppError::BadRequest("Question must not be empty".to_string()));
    }

    let session = query
        .session
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION.to_string());
    let memory = state.db.session(session.as_str());
    let answer = state.agent.answer(question, &memory);
    tracing::debug!(
        session = %memory.session_id(),
        success = answer.is_success(),
        "Answered question"
    );

    Ok(Json(AskResponse {
        response: answer.text,
        status: "success",
        session,
        intent: answer.intent,
    }))
}

// ============================================================
// Sessions
// ============================================================

async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, AppError> {
    verify_api_key(&headers, &state.config)?;

    let session = uuid::Uuid::new_v4().to_string();
    state
        .db
        .create_session(&session)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    tracing::info!(session = %session, "Session created");

    Ok(Json(SessionResponse { session }))
}

// ============================================================
// Configuration
// ============================================================

async fn get_config(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AppConfig>, AppError> {
    verify_api_key(&headers, &state.config)?;
    Ok(Json(state.config.as_ref().clone()))
}

/// Any non-empty key passes unless `API_KEY` is configured
fn verify_api_key(headers: &HeaderMap, config: &AppConfig) -> Result<(), AppError> {
    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();

    if provided.is_empty() {
        return Err(AppError::Unauthorized("API key is missing".to_string()));
    }
    match &config.api_key {
        Some(expected) if expected != provided => {
            Err(AppError::Unauthorized("Invalid API key".to_string()))
        }
        _ => Ok(()),
    }
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Unauthorized(String),
    TooManyRequests,
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests. Please try again later.".to_string(),
            ),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while processing your question".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
