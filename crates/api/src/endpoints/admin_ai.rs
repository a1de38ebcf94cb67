//! Admin AI tool endpoints.

use axum::{Json, Router, extract::State, routing::post};
use devflow_common::AppResult;
use serde::Deserialize;

use crate::{extractors::AdminUser, middleware::AppState, response::ApiResponse};

/// Admin chat request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub prompt: String,
}

/// Chat with the admin assistant.
async fn chat(
    AdminUser(_user): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = state.admin_tool_service.chat(&req.prompt).await?;
    Ok(ApiResponse::ok(result))
}

/// Admin SQL request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSqlRequest {
    pub prompt: String,
    pub password: Option<String>,
}

/// Run SQL through the admin assistant.
async fn run_sql(
    AdminUser(_user): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<RunSqlRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = state
        .admin_tool_service
        .run_sql(&req.prompt, req.password.as_deref())
        .await?;
    Ok(ApiResponse::ok(result))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/run-sql", post(run_sql))
}
