//! User endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use devflow_common::AppResult;
use devflow_db::entities::{reputation_change, user};
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// User profile response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub reputation: i32,
    pub questions_count: i32,
    pub answers_count: i32,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            name: u.name,
            bio: u.bio,
            reputation: u.reputation,
            questions_count: u.questions_count,
            answers_count: u.answers_count,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Reputation ledger entry response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationChangeResponse {
    pub id: String,
    pub amount: i32,
    pub reason: reputation_change::Reason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
    pub created_at: String,
}

impl From<reputation_change::Model> for ReputationChangeResponse {
    fn from(rc: reputation_change::Model) -> Self {
        Self {
            id: rc.id,
            amount: rc.amount,
            reason: rc.reason,
            related_id: rc.related_id,
            created_at: rc.created_at.to_rfc3339(),
        }
    }
}

/// Get a user profile.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get(&id).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Reputation ledger request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    20
}

/// Get a user's reputation ledger.
async fn reputation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<LedgerQuery>,
) -> AppResult<ApiResponse<Vec<ReputationChangeResponse>>> {
    let entries = state
        .user_service
        .reputation_ledger(&id, params.limit, params.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(entries.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(show))
        .route("/{id}/reputation", get(reputation))
}
