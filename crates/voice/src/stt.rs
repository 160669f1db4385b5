use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::events::TranscriptFragment;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SttError {
    #[error("transcription connect failed: {0}")]
    Connect(String),
    #[error("transcription send failed: {0}")]
    Send(String),
    #[error("transcription receive failed: {0}")]
    Receive(String),
}

/// A live transcription connection for one call: raw audio bytes in,
/// transcript fragments out. `next_fragment` yields `None` once the
/// provider closes the stream.
#[async_trait]
pub trait TranscriptionStream: Send + Sync {
    async fn send_audio(&self, payload: &[u8]) -> Result<(), SttError>;
    async fn next_fragment(&self) -> Result<Option<TranscriptFragment>, SttError>;
    /// Closes the connection. Must be called on every teardown path; a
    /// leaked open connection is a resource-leak defect.
    async fn finish(&self) -> Result<(), SttError>;
}

/// Opens one fresh transcription connection per call.
#[async_trait]
pub trait TranscriptionConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn TranscriptionStream>, SttError>;
}
