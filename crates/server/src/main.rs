//! Devflow server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use devflow_api::{middleware::AppState, router as api_router};
use devflow_common::Config;
use devflow_core::{
    AdminToolService, AiAnswerService, AnswerService, DynEmbeddingProvider, DynGenerativeProvider,
    DynSpeechProvider, ElevenLabsProvider, MockAiProvider, MockSpeechProvider, OpenAiProvider,
    ProcessCommandRunner, QuestionService, SummaryService, UserService, VoiceService, VoteService,
};
use devflow_db::repositories::{
    AnswerRepository, EmbeddingRepository, QuestionRepository, ReputationRepository,
    UserRepository, VoteRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devflow=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting devflow server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = devflow_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    devflow_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let question_repo = QuestionRepository::new(Arc::clone(&db));
    let answer_repo = AnswerRepository::new(Arc::clone(&db));
    let vote_repo = VoteRepository::new(Arc::clone(&db));
    let reputation_repo = ReputationRepository::new(Arc::clone(&db));
    let embedding_repo = EmbeddingRepository::new(Arc::clone(&db));

    // Initialize AI providers (mocks when no keys are configured)
    let (generative, embeddings): (DynGenerativeProvider, DynEmbeddingProvider) =
        if config.ai.api_key.is_some() {
            let provider = Arc::new(OpenAiProvider::new(config.ai.clone()));
            (provider.clone(), provider)
        } else {
            info!("No AI API key configured; using mock provider");
            let provider = Arc::new(MockAiProvider::new());
            (provider.clone(), provider)
        };

    let speech: DynSpeechProvider = if config.voice.api_key.is_some() {
        Arc::new(ElevenLabsProvider::new(config.voice.clone()))
    } else {
        info!("No voice API key configured; using mock provider");
        Arc::new(MockSpeechProvider::new())
    };

    // Initialize services
    let user_service = UserService::new(user_repo.clone(), reputation_repo);
    let question_service = QuestionService::new(question_repo.clone(), user_repo.clone());
    let answer_service = AnswerService::new(
        answer_repo.clone(),
        question_repo.clone(),
        user_repo.clone(),
        config.reputation,
    );
    let vote_service = VoteService::new(
        vote_repo,
        question_repo.clone(),
        answer_repo.clone(),
        config.reputation,
    );

    // The AI assistant needs a user row to author answers
    let ai_user = user_service.ensure_ai_user().await?;
    let ai_answer_service = AiAnswerService::new(
        question_repo.clone(),
        answer_repo.clone(),
        embedding_repo,
        generative.clone(),
        embeddings,
        config.ai.clone(),
        ai_user.id,
    );

    let summary_service = SummaryService::new(question_repo, answer_repo, generative);
    let voice_service = VoiceService::new(speech, config.voice.clone());
    let admin_tool_service =
        AdminToolService::new(Arc::new(ProcessCommandRunner), config.admin_tool.clone());

    // Create app state
    let state = AppState {
        user_service,
        question_service,
        answer_service,
        vote_service,
        ai_answer_service,
        summary_service,
        voice_service,
        admin_tool_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            devflow_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
