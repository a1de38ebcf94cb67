//! Text-to-speech service.
//!
//! The free tier is enforced locally: a per-user conversion counter and an
//! input length cap are checked before any provider call. The counter lives
//! in process memory, resets on restart, and is a UX nudge rather than an
//! authorization control.

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use devflow_common::{AppError, AppResult, VoiceConfig};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::services::provider::DynSpeechProvider;

/// A synthesized audio clip.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechAudio {
    /// Base64-encoded audio bytes.
    pub audio_base64: String,
    /// Characters converted.
    pub characters: usize,
}

/// Voice service.
#[derive(Clone)]
pub struct VoiceService {
    speech: DynSpeechProvider,
    config: VoiceConfig,
    usage: Arc<RwLock<HashMap<String, u32>>>,
}

impl VoiceService {
    /// Create a new voice service.
    #[must_use]
    pub fn new(speech: DynSpeechProvider, config: VoiceConfig) -> Self {
        Self {
            speech,
            config,
            usage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Convert text to speech for a user.
    ///
    /// Rejects locally, before any network call, when the input exceeds the
    /// length cap or the user's free conversions are used up.
    pub async fn text_to_speech(&self, user_id: &str, text: &str) -> AppResult<SpeechAudio> {
        let characters = text.chars().count();

        if characters == 0 {
            return Err(AppError::BadRequest("Text must not be empty".to_string()));
        }

        if characters > self.config.max_input_chars {
            return Err(AppError::UpgradeRequired(format!(
                "Free tier is limited to {} characters",
                self.config.max_input_chars
            )));
        }

        {
            let usage = self.usage.read().await;
            if usage.get(user_id).copied().unwrap_or(0) >= self.config.free_conversions {
                return Err(AppError::UpgradeRequired(
                    "Free voice conversions used up".to_string(),
                ));
            }
        }

        let audio = self.speech.synthesize(text).await?;

        // Failed provider calls do not consume the free conversion
        let mut usage = self.usage.write().await;
        *usage.entry(user_id.to_string()).or_insert(0) += 1;

        Ok(SpeechAudio {
            audio_base64: BASE64.encode(audio),
            characters,
        })
    }
}
