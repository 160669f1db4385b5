/// Events on a telephony media stream, in arrival order: exactly one
/// `Started`, any number of `Audio` frames, then `Stopped`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallEvent {
    Started { call_id: String, stream_id: String },
    Audio(Vec<u8>),
    Stopped,
}

impl CallEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::Audio(_) => "audio",
            Self::Stopped => "stopped",
        }
    }
}

/// One transcript fragment from the transcription source. Only finalized
/// fragments that close a spoken thought may trigger a conversation turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscriptFragment {
    pub text: String,
    pub is_final: bool,
    pub speech_final: bool,
}

impl TranscriptFragment {
    /// The turn gate: final, end-of-speech, and non-empty. Partial
    /// fragments never reach the conversation state machine.
    pub fn is_turn_trigger(&self) -> bool {
        self.is_final && self.speech_final && !self.text.trim().is_empty()
    }
}
