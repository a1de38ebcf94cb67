//! Vote endpoints.

use axum::{Json, Router, extract::State, routing::post};
use devflow_common::AppResult;
use devflow_db::entities::vote::{Direction, TargetType};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Cast vote request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    pub target_type: TargetType,
    pub target_id: String,
    pub direction: Direction,
}

/// Cast vote response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteResponse {
    /// The user's resulting vote on the target, if any.
    pub vote_state: Option<Direction>,
}

/// Cast, toggle, or flip a vote.
async fn cast(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CastVoteRequest>,
) -> AppResult<ApiResponse<CastVoteResponse>> {
    let vote_state = state
        .vote_service
        .cast(&user.id, req.target_type, &req.target_id, req.direction)
        .await?;

    Ok(ApiResponse::ok(CastVoteResponse { vote_state }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(cast))
}
