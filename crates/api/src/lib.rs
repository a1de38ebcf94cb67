//! HTTP API layer for devflow.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: questions, answers, votes, AI features, admin tools
//! - **Extractors**: authentication
//! - **Middleware**: bearer-token auth, app state
//!
//! Built on Axum 0.8 with Tower middleware stack.

// Allow dead_code for API compatibility fields in request structs
#![allow(dead_code)]

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
