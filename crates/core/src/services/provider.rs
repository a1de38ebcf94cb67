//! AI provider clients.
//!
//! Three seams: generative text, embeddings, and speech synthesis. Each has
//! an HTTP implementation and a mock used for local development and tests.
//! Provider failures are surfaced directly; nothing here retries, and a
//! request already sent cannot be cancelled.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::Deserialize;

use devflow_common::{AiConfig, AppError, AppResult, VoiceConfig};

/// A generative completion.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Generated text.
    pub text: String,
    /// Model that produced it.
    pub model: String,
    /// Provider-reported confidence, when available.
    pub confidence: Option<f32>,
}

/// Generative text provider.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Run a single completion for the prompt.
    async fn complete(&self, prompt: &str) -> AppResult<Completion>;
}

/// Embedding provider.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed the text into a fixed-length vector.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
}

/// Speech synthesis provider.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Convert text to audio bytes.
    async fn synthesize(&self, text: &str) -> AppResult<Vec<u8>>;
}

/// OpenAI-compatible provider for completions and embeddings.
#[derive(Clone)]
pub struct OpenAiProvider {
    config: AiConfig,
    http_client: reqwest::Client,
}

impl OpenAiProvider {
    /// Create a new provider from configuration.
    #[must_use]
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn api_key(&self) -> AppResult<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("AI provider API key not configured".to_string()))
    }
}

#[async_trait]
impl GenerativeProvider for OpenAiProvider {
    async fn complete(&self, prompt: &str) -> AppResult<Completion> {
        let api_key = self.api_key()?;

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "temperature": 0.3,
        });

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::GenerationFailed(format!("Completion request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GenerationFailed(format!(
                "Completion API error: {status} - {body}"
            )));
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            model: String,
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatMessage,
        }

        #[derive(Deserialize)]
        struct ChatMessage {
            content: String,
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            AppError::GenerationFailed(format!("Failed to parse completion response: {e}"))
        })?;

        let text = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::GenerationFailed("No completion returned".to_string()))?
            .message
            .content
            .trim()
            .to_string();

        Ok(Completion {
            text,
            model: chat_response.model,
            confidence: None,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let api_key = self.api_key()?;

        let body = serde_json::json!({
            "model": self.config.embedding_model,
            "input": text,
        });

        let response = self
            .http_client
            .post(format!("{}/embeddings", self.config.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::GenerationFailed(format!("Embedding request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GenerationFailed(format!(
                "Embedding API error: {status} - {body}"
            )));
        }

        #[derive(Deserialize)]
        struct EmbeddingResponse {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            embedding: Vec<f32>,
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::GenerationFailed(format!("Failed to parse embedding response: {e}"))
        })?;

        embedding_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AppError::GenerationFailed("No embedding returned".to_string()))
    }
}

/// ElevenLabs-style HTTP speech provider.
#[derive(Clone)]
pub struct ElevenLabsProvider {
    config: VoiceConfig,
    http_client: reqwest::Client,
}

impl ElevenLabsProvider {
    /// Create a new provider from configuration.
    #[must_use]
    pub fn new(config: VoiceConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsProvider {
    async fn synthesize(&self, text: &str) -> AppResult<Vec<u8>> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            AppError::BadRequest("Voice provider API key not configured".to_string())
        })?;

        let body = serde_json::json!({
            "text": text,
            "model_id": "eleven_monolingual_v1",
        });

        let response = self
            .http_client
            .post(format!(
                "{}/text-to-speech/{}",
                self.config.base_url, self.config.voice_id
            ))
            .header("xi-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::VoiceGenerationFailed(format!("TTS request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::VoiceGenerationFailed(format!(
                "TTS API error: {status} - {body}"
            )));
        }

        let bytes = response.bytes().await.map_err(|e| {
            AppError::VoiceGenerationFailed(format!("Failed to read TTS response: {e}"))
        })?;

        Ok(bytes.to_vec())
    }
}

/// Mock completion/embedding provider with fixed responses.
#[derive(Debug, Default)]
pub struct MockAiProvider {
    calls: AtomicUsize,
}

impl MockAiProvider {
    /// Fixed confidence reported for mock completions.
    pub const MOCK_CONFIDENCE: f32 = 0.85;

    /// Create a new mock provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of provider calls made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeProvider for MockAiProvider {
    async fn complete(&self, prompt: &str) -> AppResult<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Completion {
            text: format!(
                "Based on similar questions in the community, here is a suggested approach. \
                 (prompt was {} characters)",
                prompt.chars().count()
            ),
            model: "mock-model".to_string(),
            confidence: Some(Self::MOCK_CONFIDENCE),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for MockAiProvider {
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Deterministic pseudo-embedding so similarity tests are stable
        let seed = text.bytes().map(u32::from).sum::<u32>() % 97;
        Ok((0..8u32).map(|i| ((seed + i) % 97) as f32 / 97.0).collect())
    }
}

/// Mock speech provider that counts calls, for quota tests.
#[derive(Debug, Default)]
pub struct MockSpeechProvider {
    calls: AtomicUsize,
}

impl MockSpeechProvider {
    /// Create a new mock provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of synthesis calls made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechProvider for MockSpeechProvider {
    async fn synthesize(&self, _text: &str) -> AppResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![0x52, 0x49, 0x46, 0x46]) // "RIFF"
    }
}

/// Shared generative provider handle.
pub type DynGenerativeProvider = Arc<dyn GenerativeProvider>;
/// Shared embedding provider handle.
pub type DynEmbeddingProvider = Arc<dyn EmbeddingProvider>;
/// Shared speech provider handle.
pub type DynSpeechProvider = Arc<dyn SpeechProvider>;
