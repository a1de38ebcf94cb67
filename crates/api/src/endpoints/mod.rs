//! API endpoints.

mod admin_ai;
mod ai;
mod questions;
mod users;
mod votes;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/questions", questions::router())
        .nest("/votes", votes::router())
        .nest("/ai", ai::router())
        .nest("/admin-ai", admin_ai::router())
        .nest("/users", users::router())
}
