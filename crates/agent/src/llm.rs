use async_trait::async_trait;
use thiserror::Error;

use dineline_core::domain::transcript::{Message, ToolInvocation};

/// A single reasoning-engine reply: free text, requested actions, or both.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssistantReply {
    pub text: String,
    pub calls: Vec<ToolInvocation>,
}

impl AssistantReply {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self { text: text.into(), calls: Vec::new() }
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    /// The reasoning engine could not produce a usable reply. Aborts the
    /// current turn only; the caller decides whether to retry or apologize.
    #[error("reasoning engine unavailable: {0}")]
    ReasoningUnavailable(String),
}

/// The opaque tool-calling oracle. Receives the freshly built system
/// instruction plus the session's full ordered history on every call.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        system_instruction: &str,
        history: &[Message],
    ) -> Result<AssistantReply, AgentError>;
}
