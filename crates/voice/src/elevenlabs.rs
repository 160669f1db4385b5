use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use dineline_core::config::SynthesisConfig;

use crate::tts::{SpeechSynthesizer, TtsError};

/// ElevenLabs REST synthesis adapter. Requests mu-law 8 kHz output so the
/// payload can be written to the telephony stream unmodified.
pub struct ElevenLabsSynthesizer {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    voice_id: String,
}

impl ElevenLabsSynthesizer {
    pub fn new(config: &SynthesisConfig) -> Result<Self, TtsError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            TtsError::Synthesis("synthesis.api_key is not configured".to_string())
        })?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            voice_id: config.voice_id.clone(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError> {
        let url = format!(
            "{}/v1/text-to-speech/{}?output_format=ulaw_8000",
            self.base_url, self.voice_id
        );

        let response = self
            .http
            .post(&url)
            .header("xi-api-key", self.api_key.expose_secret())
            .json(&json!({
                "text": text,
                "model_id": "eleven_turbo_v2",
            }))
            .send()
            .await
            .map_err(|error| TtsError::Synthesis(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TtsError::Synthesis(format!("synthesis returned status {status}")));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|error| TtsError::Synthesis(error.to_string()))?;

        Ok(audio.to_vec())
    }
}
