use async_trait::async_trait;
use thiserror::Error;

use crate::events::CallEvent;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport receive failed: {0}")]
    Receive(String),
    #[error("transport send failed: {0}")]
    Send(String),
    #[error("call transfer failed: {0}")]
    Transfer(String),
}

/// One call's bidirectional audio stream. `next_event` yields `None` when
/// the remote side closes the stream.
#[async_trait]
pub trait MediaStream: Send + Sync {
    async fn next_event(&self) -> Result<Option<CallEvent>, TransportError>;
    async fn send_audio(&self, payload: &[u8]) -> Result<(), TransportError>;
}

/// Out-of-band call control, distinct from the audio stream.
#[async_trait]
pub trait CallControl: Send + Sync {
    /// Unconditionally redirects the active call to `destination`.
    async fn transfer(&self, call_id: &str, destination: &str) -> Result<(), TransportError>;
}

/// Control channel for surfaces with no transferable call (the terminal
/// simulator).
#[derive(Default)]
pub struct NoopCallControl;

#[async_trait]
impl CallControl for NoopCallControl {
    async fn transfer(&self, _call_id: &str, _destination: &str) -> Result<(), TransportError> {
        Ok(())
    }
}
