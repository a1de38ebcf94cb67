//! Question endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use devflow_common::AppResult;
use devflow_core::{CreateAnswerInput, CreateQuestionInput};
use devflow_db::entities::{answer, question};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Question response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub body: String,
    pub status: question::Status,
    pub view_count: i32,
    pub answer_count: i32,
    pub upvotes: i32,
    pub downvotes: i32,
    pub score: i32,
    pub created_at: String,
}

impl From<question::Model> for QuestionResponse {
    fn from(q: question::Model) -> Self {
        Self {
            score: q.score(),
            id: q.id,
            author_id: q.author_id,
            title: q.title,
            body: q.body,
            status: q.status,
            view_count: q.view_count,
            answer_count: q.answer_count,
            upvotes: q.upvotes,
            downvotes: q.downvotes,
            created_at: q.created_at.to_rfc3339(),
        }
    }
}

/// Answer response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub id: String,
    pub question_id: String,
    pub author_id: String,
    pub body: String,
    pub is_accepted: bool,
    pub is_ai_generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_confidence: Option<f32>,
    pub upvotes: i32,
    pub downvotes: i32,
    pub score: i32,
    pub created_at: String,
}

impl From<answer::Model> for AnswerResponse {
    fn from(a: answer::Model) -> Self {
        Self {
            score: a.score(),
            id: a.id,
            question_id: a.question_id,
            author_id: a.author_id,
            body: a.body,
            is_accepted: a.is_accepted,
            is_ai_generated: a.is_ai_generated,
            ai_model: a.ai_model,
            ai_confidence: a.ai_confidence,
            upvotes: a.upvotes,
            downvotes: a.downvotes,
            created_at: a.created_at.to_rfc3339(),
        }
    }
}

/// List questions request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuestionsQuery {
    pub status: Option<question::Status>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    20
}

/// List questions.
async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListQuestionsQuery>,
) -> AppResult<ApiResponse<Vec<QuestionResponse>>> {
    let questions = state
        .question_service
        .list(params.status, params.limit, params.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        questions.into_iter().map(Into::into).collect(),
    ))
}

/// Post a new question.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateQuestionInput>,
) -> AppResult<ApiResponse<QuestionResponse>> {
    let question = state.question_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(question.into()))
}

/// Get a question, recording the view.
async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<QuestionResponse>> {
    let question = state
        .question_service
        .get(&id, viewer.as_ref().map(|u| u.id.as_str()))
        .await?;
    Ok(ApiResponse::ok(question.into()))
}

/// Accept answer request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequest {
    pub answer_id: String,
}

/// Mark a question solved by accepting an answer.
async fn solve(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SolveRequest>,
) -> AppResult<ApiResponse<AnswerResponse>> {
    let answer = state
        .answer_service
        .accept(&id, &req.answer_id, &user.id)
        .await?;
    Ok(ApiResponse::ok(answer.into()))
}

/// Post an answer to a question.
async fn create_answer(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CreateAnswerInput>,
) -> AppResult<ApiResponse<AnswerResponse>> {
    let answer = state.answer_service.create(&user.id, &id, input).await?;
    Ok(ApiResponse::ok(answer.into()))
}

/// List answers request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAnswersQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub since_id: Option<String>,
}

/// List answers for a question.
async fn list_answers(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ListAnswersQuery>,
) -> AppResult<ApiResponse<Vec<AnswerResponse>>> {
    let answers = state
        .answer_service
        .list_for_question(&id, params.limit.min(100), params.since_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        answers.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show))
        .route("/{id}/solve", patch(solve))
        .route("/{id}/answers", post(create_answer).get(list_answers))
}
