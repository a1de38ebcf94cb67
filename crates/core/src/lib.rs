//! Core business logic for devflow.

pub mod services;

pub use services::*;
