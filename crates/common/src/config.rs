//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// AI provider configuration.
    #[serde(default)]
    pub ai: AiConfig,
    /// Text-to-speech configuration.
    #[serde(default)]
    pub voice: VoiceConfig,
    /// Reputation point values.
    #[serde(default)]
    pub reputation: ReputationConfig,
    /// Admin AI tool configuration.
    #[serde(default)]
    pub admin_tool: AdminToolConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// AI provider configuration (generative text + embeddings).
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Provider API key. When unset the mock providers are used.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    /// Generative model name.
    #[serde(default = "default_ai_model")]
    pub model: String,
    /// Embedding model name.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    /// Minimum cosine similarity for a question to count as a neighbor.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
    /// Maximum number of similar questions fed into the prompt context.
    #[serde(default = "default_max_context_questions")]
    pub max_context_questions: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_ai_base_url(),
            model: default_ai_model(),
            embedding_model: default_embedding_model(),
            similarity_threshold: default_similarity_threshold(),
            max_context_questions: default_max_context_questions(),
        }
    }
}

/// Text-to-speech configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    /// TTS provider API key. When unset the mock provider is used.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL of the TTS provider.
    #[serde(default = "default_voice_base_url")]
    pub base_url: String,
    /// Voice identifier passed to the provider.
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    /// Free conversions per user before an upgrade is required.
    #[serde(default = "default_free_conversions")]
    pub free_conversions: u32,
    /// Maximum input length in characters.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_voice_base_url(),
            voice_id: default_voice_id(),
            free_conversions: default_free_conversions(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

/// Reputation point values.
///
/// The observed increments are treated as configuration rather than fixed
/// law; deployments may tune them without code changes.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReputationConfig {
    /// Awarded to a question author per upvote.
    #[serde(default = "default_question_upvote")]
    pub question_upvote: i32,
    /// Applied to a question author per downvote (negative).
    #[serde(default = "default_question_downvote")]
    pub question_downvote: i32,
    /// Awarded to an answer author per upvote.
    #[serde(default = "default_answer_upvote")]
    pub answer_upvote: i32,
    /// Applied to an answer author per downvote (negative).
    #[serde(default = "default_answer_downvote")]
    pub answer_downvote: i32,
    /// Awarded to the asker when they accept an answer.
    #[serde(default = "default_accept_asker")]
    pub accept_asker: i32,
    /// Awarded to the author of an accepted answer.
    #[serde(default = "default_accept_author")]
    pub accept_author: i32,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            question_upvote: default_question_upvote(),
            question_downvote: default_question_downvote(),
            answer_upvote: default_answer_upvote(),
            answer_downvote: default_answer_downvote(),
            accept_asker: default_accept_asker(),
            accept_author: default_accept_author(),
        }
    }
}

/// Admin AI tool configuration (external interpreter process).
#[derive(Debug, Clone, Deserialize)]
pub struct AdminToolConfig {
    /// Interpreter executable.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    /// Script path handed to the interpreter.
    #[serde(default = "default_script_path")]
    pub script_path: String,
    /// Password forwarded to the script for SQL execution.
    #[serde(default)]
    pub sql_password: Option<String>,
    /// Subprocess timeout in seconds.
    #[serde(default = "default_tool_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AdminToolConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            script_path: default_script_path(),
            sql_password: None,
            timeout_secs: default_tool_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

fn default_ai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

const fn default_similarity_threshold() -> f32 {
    0.65
}

const fn default_max_context_questions() -> u64 {
    5
}

fn default_voice_base_url() -> String {
    "https://api.elevenlabs.io/v1".to_string()
}

fn default_voice_id() -> String {
    "21m00Tcm4TlvDq8ikWAM".to_string()
}

const fn default_free_conversions() -> u32 {
    1
}

const fn default_max_input_chars() -> usize {
    500
}

const fn default_question_upvote() -> i32 {
    5
}

const fn default_question_downvote() -> i32 {
    -2
}

const fn default_answer_upvote() -> i32 {
    10
}

const fn default_answer_downvote() -> i32 {
    -2
}

const fn default_accept_asker() -> i32 {
    2
}

const fn default_accept_author() -> i32 {
    15
}

const fn default_tool_timeout_secs() -> u64 {
    30
}

fn default_interpreter() -> String {
    "python3".to_string()
}

fn default_script_path() -> String {
    "tools/admin_assistant.py".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `DEVFLOW_ENV`)
    /// 3. Environment variables with `DEVFLOW_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("DEVFLOW_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("DEVFLOW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("DEVFLOW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reputation_defaults() {
        let points = ReputationConfig::default();
        assert_eq!(points.question_upvote, 5);
        assert_eq!(points.question_downvote, -2);
        assert_eq!(points.answer_upvote, 10);
        assert_eq!(points.answer_downvote, -2);
        assert_eq!(points.accept_asker, 2);
        assert_eq!(points.accept_author, 15);
    }

    #[test]
    fn test_ai_defaults() {
        let ai = AiConfig::default();
        assert!(ai.api_key.is_none());
        assert_eq!(ai.similarity_threshold, 0.65);
        assert_eq!(ai.max_context_questions, 5);
    }

    #[test]
    fn test_voice_defaults() {
        let voice = VoiceConfig::default();
        assert_eq!(voice.free_conversions, 1);
        assert_eq!(voice.max_input_chars, 500);
    }
}
