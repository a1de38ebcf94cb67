//! AI endpoints: answer generation, similarity lookups, summary, voice.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use devflow_common::AppResult;
use devflow_core::{SimilarQuestion, SpeechAudio, Summary};
use serde::{Deserialize, Serialize};

use crate::endpoints::questions::{AnswerResponse, QuestionResponse};
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Generate (or return the existing) AI answer for a question.
async fn generate_answer(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> AppResult<ApiResponse<AnswerResponse>> {
    let answer = state.ai_answer_service.generate(&question_id).await?;
    Ok(ApiResponse::ok(answer.into()))
}

/// Existing AI answer response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingAnswerResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<AnswerResponse>,
}

/// Check whether an AI answer already exists for a question.
async fn check_existing(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> AppResult<ApiResponse<ExistingAnswerResponse>> {
    let answer = state.ai_answer_service.check_existing(&question_id).await?;

    Ok(ApiResponse::ok(ExistingAnswerResponse {
        exists: answer.is_some(),
        answer: answer.map(Into::into),
    }))
}

/// Similar question response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarQuestionResponse {
    pub question: QuestionResponse,
    pub similarity: f64,
}

impl From<SimilarQuestion> for SimilarQuestionResponse {
    fn from(s: SimilarQuestion) -> Self {
        Self {
            question: s.question.into(),
            similarity: s.similarity,
        }
    }
}

/// Get embedding-similar questions.
async fn similar_questions(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> AppResult<ApiResponse<Vec<SimilarQuestionResponse>>> {
    let similar = state
        .ai_answer_service
        .similar_questions(&question_id)
        .await?;

    Ok(ApiResponse::ok(similar.into_iter().map(Into::into).collect()))
}

/// Summarize a question thread.
async fn summary(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> AppResult<ApiResponse<Summary>> {
    let summary = state.summary_service.generate(&question_id).await?;
    Ok(ApiResponse::ok(summary))
}

/// Text-to-speech request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToSpeechRequest {
    pub text: String,
}

/// Convert text to speech within the free tier.
async fn text_to_speech(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<TextToSpeechRequest>,
) -> AppResult<ApiResponse<SpeechAudio>> {
    let audio = state
        .voice_service
        .text_to_speech(&user.id, &req.text)
        .await?;
    Ok(ApiResponse::ok(audio))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate-answer/{question_id}", post(generate_answer))
        .route("/check-existing/{question_id}", get(check_existing))
        .route("/similar-questions/{question_id}", get(similar_questions))
        .route("/summary/{question_id}", post(summary))
        .route("/text-to-speech", post(text_to_speech))
}
