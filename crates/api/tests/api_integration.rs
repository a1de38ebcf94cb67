//! API integration tests.
//!
//! These tests verify routing, authentication, and error mapping with a
//! mock database and mock AI providers.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware as axum_middleware,
};
use chrono::Utc;
use devflow_api::{middleware::AppState, router as api_router};
use devflow_common::{AdminToolConfig, AiConfig, ReputationConfig, VoiceConfig};
use devflow_core::{
    AdminToolService, AiAnswerService, AnswerService, MockAiProvider, MockSpeechProvider,
    ProcessCommandRunner, QuestionService, SummaryService, UserService, VoiceService, VoteService,
};
use devflow_db::entities::{question, user};
use devflow_db::repositories::{
    AnswerRepository, EmbeddingRepository, QuestionRepository, ReputationRepository,
    UserRepository, VoteRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use tower::ServiceExt;

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn test_user(id: &str, is_admin: bool) -> user::Model {
    user::Model {
        id: id.to_string(),
        username: format!("user-{id}"),
        token: Some("test-token".to_string()),
        name: None,
        bio: None,
        reputation: 0,
        questions_count: 0,
        answers_count: 0,
        is_admin,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

struct TestDbs {
    user: DatabaseConnection,
    question: DatabaseConnection,
    answer: DatabaseConnection,
    vote: DatabaseConnection,
    reputation: DatabaseConnection,
    embedding: DatabaseConnection,
}

impl Default for TestDbs {
    fn default() -> Self {
        Self {
            user: empty_db(),
            question: empty_db(),
            answer: empty_db(),
            vote: empty_db(),
            reputation: empty_db(),
            embedding: empty_db(),
        }
    }
}

/// Build an app with the given mock databases and mock providers.
fn create_app(dbs: TestDbs) -> Router {
    let user_repo = UserRepository::new(Arc::new(dbs.user));
    let question_repo = QuestionRepository::new(Arc::new(dbs.question));
    let answer_repo = AnswerRepository::new(Arc::new(dbs.answer));
    let vote_repo = VoteRepository::new(Arc::new(dbs.vote));
    let reputation_repo = ReputationRepository::new(Arc::new(dbs.reputation));
    let embedding_repo = EmbeddingRepository::new(Arc::new(dbs.embedding));

    let ai_provider = Arc::new(MockAiProvider::new());
    let speech_provider = Arc::new(MockSpeechProvider::new());

    let state = AppState {
        user_service: UserService::new(user_repo.clone(), reputation_repo),
        question_service: QuestionService::new(question_repo.clone(), user_repo.clone()),
        answer_service: AnswerService::new(
            answer_repo.clone(),
            question_repo.clone(),
            user_repo,
            ReputationConfig::default(),
        ),
        vote_service: VoteService::new(
            vote_repo,
            question_repo.clone(),
            answer_repo.clone(),
            ReputationConfig::default(),
        ),
        ai_answer_service: AiAnswerService::new(
            question_repo.clone(),
            answer_repo.clone(),
            embedding_repo,
            ai_provider.clone(),
            ai_provider,
            AiConfig::default(),
            "ai-assistant".to_string(),
        ),
        summary_service: SummaryService::new(
            question_repo,
            answer_repo,
            Arc::new(MockAiProvider::new()),
        ),
        voice_service: VoiceService::new(speech_provider, VoiceConfig::default()),
        admin_tool_service: AdminToolService::new(
            Arc::new(ProcessCommandRunner),
            AdminToolConfig::default(),
        ),
    };

    Router::new()
        .nest("/api", api_router())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            devflow_api::middleware::auth_middleware,
        ))
        .with_state(state)
}

fn json_request(method: &str, uri: &str, authed: bool, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if authed {
        builder = builder.header(header::AUTHORIZATION, "Bearer test-token");
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_list_questions_ok() {
    let dbs = TestDbs {
        question: MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<question::Model>::new()])
            .into_connection(),
        ..Default::default()
    };
    let app = create_app(dbs);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/questions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_missing_question_is_404() {
    let dbs = TestDbs {
        question: MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<question::Model>::new()])
            .into_connection(),
        ..Default::default()
    };
    let app = create_app(dbs);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/questions/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_question_requires_auth() {
    let app = create_app(TestDbs::default());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/questions",
            false,
            serde_json::json!({
                "title": "A long enough question title",
                "body": "A long enough question body for validation.",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cast_vote_requires_auth() {
    let app = create_app(TestDbs::default());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/votes",
            false,
            serde_json::json!({
                "targetType": "answer",
                "targetId": "a1",
                "direction": "up",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_chat_forbidden_for_regular_user() {
    let dbs = TestDbs {
        user: MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("u1", false)]])
            .into_connection(),
        ..Default::default()
    };
    let app = create_app(dbs);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/admin-ai/chat",
            true,
            serde_json::json!({ "prompt": "show me the tables" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_text_to_speech_over_limit_is_payment_required() {
    let dbs = TestDbs {
        user: MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("u1", false)]])
            .into_connection(),
        ..Default::default()
    };
    let app = create_app(dbs);

    let long_text = "a".repeat(600);
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/ai/text-to-speech",
            true,
            serde_json::json!({ "text": long_text }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
}

#[tokio::test]
async fn test_solve_requires_auth() {
    let app = create_app(TestDbs::default());

    let response = app
        .oneshot(json_request(
            "PATCH",
            "/api/questions/q1/solve",
            false,
            serde_json::json!({ "answerId": "a1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_validation_error_is_400() {
    let dbs = TestDbs {
        user: MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("u1", false)]])
            .into_connection(),
        ..Default::default()
    };
    let app = create_app(dbs);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/questions",
            true,
            serde_json::json!({ "title": "short", "body": "short" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
