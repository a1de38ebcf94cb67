//! Common utilities and shared types for devflow.
//!
//! This crate provides foundational components used across all devflow crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//!
//! # Example
//!
//! ```no_run
//! use devflow_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;

pub use config::{
    AdminToolConfig, AiConfig, Config, DatabaseConfig, ReputationConfig, ServerConfig, VoiceConfig,
};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
