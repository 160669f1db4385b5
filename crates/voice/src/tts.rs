use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TtsError {
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),
}

/// Text in, encoded audio out, in the transport's expected sample format.
/// Callers guard empty/whitespace-only input before invoking.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError>;
}
