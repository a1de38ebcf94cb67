//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use devflow_core::{
    AdminToolService, AiAnswerService, AnswerService, QuestionService, SummaryService,
    UserService, VoiceService, VoteService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub question_service: QuestionService,
    pub answer_service: AnswerService,
    pub vote_service: VoteService,
    pub ai_answer_service: AiAnswerService,
    pub summary_service: SummaryService,
    pub voice_service: VoiceService,
    pub admin_tool_service: AdminToolService,
}

/// Authentication middleware.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // Try to extract token from header
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        // Authenticate user by token
        match state.user_service.authenticate_by_token(token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Bearer token did not resolve to a user");
            }
        }
    }

    next.run(req).await
}
