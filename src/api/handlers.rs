//! HTTP request handlers

use super::presenter::{initial_response, present_turn};
use super::types::{
    AgentsResponse, ChatRequest, ChatResponse, ConversationListResponse, ErrorResponse,
    HealthResponse,
};
use super::AppState;
use crate::agents::agent_catalog;
use crate::runtime::TurnError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/conversations", get(list_conversations))
        .route("/agents", get(list_agents))
        .route("/health", get(health))
        .with_state(state)
}

// ============================================================
// Chat
// ============================================================

async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let known_id = match req.conversation_id.as_deref() {
        Some(id) if state.manager.exists(id).await? => Some(id),
        Some(id) => {
            tracing::info!(conv_id = %id, "Unknown conversation id, starting a new conversation");
            None
        }
        None => None,
    };

    if req.message.trim().is_empty() {
        if known_id.is_some() {
            return Err(AppError::BadRequest("message must not be empty".to_string()));
        }
        let (id, record) = state.manager.init_conversation().await?;
        return Ok(Json(initial_response(id, record)));
    }

    let turn = state.manager.chat(known_id, &req.message).await?;
    Ok(Json(present_turn(turn)))
}

// ============================================================
// Metadata
// ============================================================

async fn list_conversations(
    State(state): State<AppState>,
) -> Result<Json<ConversationListResponse>, AppError> {
    let conversations = state.manager.list().await?;
    Ok(Json(ConversationListResponse { conversations }))
}

async fn list_agents() -> Json<AgentsResponse> {
    Json(AgentsResponse {
        agents: agent_catalog(),
    })
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        models: state.llm_registry.available_models(),
    })
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Upstream(String),
    Internal(String),
}

impl From<TurnError> for AppError {
    fn from(error: TurnError) -> Self {
        tracing::error!(error = %error, "Chat turn failed");
        match error {
            TurnError::Llm(e) => AppError::Upstream(e.to_string()),
            TurnError::Store(_) | TurnError::InvalidRoute { .. } => {
                AppError::Internal(error.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
