use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use dineline_agent::conversation::ConversationEngine;
use dineline_agent::llm::AgentError;
use dineline_agent::session::CallSession;
use dineline_core::domain::transcript::Message;

use crate::events::CallEvent;
use crate::registry::SessionRegistry;
use crate::stt::{SttError, TranscriptionConnector, TranscriptionStream};
use crate::transport::{CallControl, MediaStream, TransportError};
use crate::tts::SpeechSynthesizer;

/// Spoken before disconnecting on a fatal provider failure. Fatal paths
/// must never end in a silent hangup.
const FATAL_APOLOGY: &str = "I'm sorry, we're having technical trouble taking your order right \
                             now. Please call back in a few minutes. Goodbye.";

/// Spoken when a single turn fails; the call continues.
const TURN_APOLOGY: &str = "Sorry, I'm having a little trouble. Could you say that again?";

/// Consecutive transcription receive failures tolerated before the call is
/// torn down.
const MAX_TRANSCRIPT_ERRORS: u32 = 3;

#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub greeting: String,
    pub transfer_notice: String,
    pub transfer_destination: String,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Transcription(#[from] SttError),
}

/// Per-call audio relay: an inbound loop forwarding caller audio to the
/// transcription source, and an outbound-triggering loop turning finalized
/// utterances into conversation turns and speech. The two loops share one
/// session and one cancellation token; call teardown provably stops both.
pub struct CallRelay {
    registry: Arc<SessionRegistry>,
    engine: Arc<ConversationEngine>,
    transcription: Arc<dyn TranscriptionConnector>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    control: Arc<dyn CallControl>,
    config: RelayConfig,
}

impl CallRelay {
    pub fn new(
        registry: Arc<SessionRegistry>,
        engine: Arc<ConversationEngine>,
        transcription: Arc<dyn TranscriptionConnector>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        control: Arc<dyn CallControl>,
        config: RelayConfig,
    ) -> Self {
        Self { registry, engine, transcription, synthesizer, control, config }
    }

    /// Drives one call from first transport event to teardown. Returns once
    /// both loops have stopped, the transcription connection is closed, and
    /// the session has been removed from the registry.
    pub async fn run_call(&self, transport: Arc<dyn MediaStream>) -> Result<(), RelayError> {
        let (call_id, stream_id) = loop {
            match transport.next_event().await? {
                Some(CallEvent::Started { call_id, stream_id }) => break (call_id, stream_id),
                Some(CallEvent::Audio(_)) => {
                    debug!(event_name = "voice.relay.prestart_audio", "discarding audio before start");
                }
                Some(CallEvent::Stopped) | None => return Ok(()),
            }
        };

        info!(event_name = "voice.relay.call_started", call_id, stream_id, "call started");

        let stt = match self.transcription.connect().await {
            Ok(stream) => stream,
            Err(error) => {
                warn!(
                    event_name = "voice.relay.transcription_connect_failed",
                    call_id,
                    error = %error,
                    "transcription connect failed at call start; ending call"
                );
                self.speak(transport.as_ref(), FATAL_APOLOGY).await;
                return Err(error.into());
            }
        };

        let session = self.registry.insert(&call_id);

        {
            let mut state = session.lock().await;
            self.engine.prime(&mut state);
            state.history.push(Message::assistant_text(self.config.greeting.clone()));
        }
        self.speak(transport.as_ref(), &self.config.greeting).await;

        let cancel = CancellationToken::new();
        tokio::join!(
            self.inbound_loop(&call_id, transport.as_ref(), stt.as_ref(), &cancel),
            self.outbound_loop(&call_id, transport.as_ref(), stt.as_ref(), &session, &cancel),
        );

        if let Err(error) = stt.finish().await {
            warn!(
                event_name = "voice.relay.transcription_close_failed",
                call_id,
                error = %error,
                "transcription stream did not close cleanly"
            );
        }
        self.registry.remove(&call_id);
        info!(event_name = "voice.relay.call_ended", call_id, "call torn down");

        Ok(())
    }

    /// Forwards caller audio to the transcription source until the
    /// transport stops or the call is cancelled.
    async fn inbound_loop(
        &self,
        call_id: &str,
        transport: &dyn MediaStream,
        stt: &dyn TranscriptionStream,
        cancel: &CancellationToken,
    ) {
        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => break,
                event = transport.next_event() => event,
            };

            match event {
                Ok(Some(CallEvent::Audio(payload))) => {
                    if let Err(error) = stt.send_audio(&payload).await {
                        warn!(
                            event_name = "voice.relay.audio_forward_failed",
                            call_id,
                            error = %error,
                            "dropping audio frame"
                        );
                    }
                }
                Ok(Some(CallEvent::Started { .. })) => {
                    debug!(event_name = "voice.relay.duplicate_start", call_id, "ignoring");
                }
                Ok(Some(CallEvent::Stopped)) | Ok(None) => {
                    info!(event_name = "voice.relay.transport_closed", call_id, "call ended");
                    cancel.cancel();
                    break;
                }
                Err(error) => {
                    warn!(
                        event_name = "voice.relay.transport_receive_failed",
                        call_id,
                        error = %error,
                        "ending call"
                    );
                    cancel.cancel();
                    break;
                }
            }
        }
    }

    /// Turns finalized utterances into conversation turns and speaks the
    /// replies. Owns the handoff-triggered transfer action.
    async fn outbound_loop(
        &self,
        call_id: &str,
        transport: &dyn MediaStream,
        stt: &dyn TranscriptionStream,
        session: &CallSession,
        cancel: &CancellationToken,
    ) {
        let mut consecutive_errors = 0u32;

        loop {
            let fragment = tokio::select! {
                _ = cancel.cancelled() => break,
                fragment = stt.next_fragment() => fragment,
            };

            let fragment = match fragment {
                Ok(Some(fragment)) => {
                    consecutive_errors = 0;
                    fragment
                }
                Ok(None) => {
                    info!(event_name = "voice.relay.transcription_closed", call_id, "ending call");
                    cancel.cancel();
                    break;
                }
                Err(error) => {
                    consecutive_errors += 1;
                    warn!(
                        event_name = "voice.relay.transcript_receive_failed",
                        call_id,
                        consecutive_errors,
                        error = %error,
                        "skipping transcription event"
                    );
                    if consecutive_errors >= MAX_TRANSCRIPT_ERRORS {
                        cancel.cancel();
                        break;
                    }
                    continue;
                }
            };

            if !fragment.is_turn_trigger() {
                debug!(event_name = "voice.relay.partial_fragment", call_id, "not turn-triggering");
                continue;
            }

            let utterance = fragment.text.trim().to_string();
            info!(event_name = "voice.relay.utterance", call_id, text = %utterance, "finalized utterance");

            let (reply, handoff) = {
                let mut state = session.lock().await;
                match self.engine.run_turn(&mut state, &utterance).await {
                    Ok(outcome) => (outcome.reply, state.order.handoff_requested()),
                    Err(AgentError::ReasoningUnavailable(reason)) => {
                        warn!(
                            event_name = "voice.relay.turn_failed",
                            call_id,
                            reason,
                            "turn aborted; apologizing and continuing"
                        );
                        drop(state);
                        self.speak(transport, TURN_APOLOGY).await;
                        continue;
                    }
                }
            };

            if handoff {
                self.speak(transport, &self.config.transfer_notice).await;
                match self.control.transfer(call_id, &self.config.transfer_destination).await {
                    Ok(()) => {
                        info!(
                            event_name = "voice.relay.call_transferred",
                            call_id,
                            destination = %self.config.transfer_destination,
                            "call transferred to human agent"
                        );
                    }
                    Err(error) => {
                        warn!(
                            event_name = "voice.relay.transfer_failed",
                            call_id,
                            error = %error,
                            "transfer failed; apologizing and ending call"
                        );
                        self.speak(transport, FATAL_APOLOGY).await;
                    }
                }
                cancel.cancel();
                break;
            }

            self.speak(transport, &reply).await;
        }
    }

    /// Synthesizes `text` and writes it to the outbound audio path.
    /// Empty or whitespace-only text short-circuits to no synthesis call;
    /// a synthesis failure is retried once, then the speech step is skipped.
    async fn speak(&self, transport: &dyn MediaStream, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            debug!(event_name = "voice.relay.speech_skipped", "empty text; nothing to speak");
            return;
        }

        let audio = match self.synthesizer.synthesize(text).await {
            Ok(audio) => audio,
            Err(first_error) => {
                warn!(
                    event_name = "voice.relay.synthesis_retry",
                    error = %first_error,
                    "synthesis failed; retrying once"
                );
                match self.synthesizer.synthesize(text).await {
                    Ok(audio) => audio,
                    Err(error) => {
                        warn!(
                            event_name = "voice.relay.synthesis_failed",
                            error = %error,
                            "skipping speech for this turn"
                        );
                        return;
                    }
                }
            }
        };

        if let Err(error) = transport.send_audio(&audio).await {
            warn!(
                event_name = "voice.relay.audio_send_failed",
                error = %error,
                "outbound audio dropped"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use dineline_agent::conversation::ConversationEngine;
    use dineline_agent::llm::{AgentError, AssistantReply, LlmClient};
    use dineline_agent::tools::ToolExecutor;
    use dineline_core::domain::menu::Menu;
    use dineline_core::domain::transcript::{ActionRequest, Message, ToolInvocation};

    use crate::events::{CallEvent, TranscriptFragment};
    use crate::registry::SessionRegistry;
    use crate::stt::{SttError, TranscriptionConnector, TranscriptionStream};
    use crate::transport::{CallControl, MediaStream, TransportError};
    use crate::tts::{SpeechSynthesizer, TtsError};

    use super::{CallRelay, RelayConfig};

    struct ScriptedMedia {
        events: Mutex<VecDeque<Result<Option<CallEvent>, TransportError>>>,
        sent: Mutex<Vec<Vec<u8>>>,
    }

    impl ScriptedMedia {
        fn with_script(events: Vec<Result<Option<CallEvent>, TransportError>>) -> Arc<Self> {
            Arc::new(Self { events: Mutex::new(events.into()), sent: Mutex::new(Vec::new()) })
        }

        async fn sent(&self) -> Vec<Vec<u8>> {
            self.sent.lock().await.clone()
        }
    }

    #[async_trait]
    impl MediaStream for ScriptedMedia {
        async fn next_event(&self) -> Result<Option<CallEvent>, TransportError> {
            let next = self.events.lock().await.pop_front();
            match next {
                Some(event) => event,
                // Script exhausted: keep the line open until cancellation.
                None => std::future::pending().await,
            }
        }

        async fn send_audio(&self, payload: &[u8]) -> Result<(), TransportError> {
            self.sent.lock().await.push(payload.to_vec());
            Ok(())
        }
    }

    struct ScriptedStt {
        fragments: Mutex<VecDeque<Result<Option<TranscriptFragment>, SttError>>>,
        forwarded: Mutex<Vec<Vec<u8>>>,
        finished: Mutex<bool>,
    }

    impl ScriptedStt {
        fn with_script(
            fragments: Vec<Result<Option<TranscriptFragment>, SttError>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                fragments: Mutex::new(fragments.into()),
                forwarded: Mutex::new(Vec::new()),
                finished: Mutex::new(false),
            })
        }

        async fn finished(&self) -> bool {
            *self.finished.lock().await
        }

        async fn forwarded(&self) -> Vec<Vec<u8>> {
            self.forwarded.lock().await.clone()
        }
    }

    #[async_trait]
    impl TranscriptionStream for ScriptedStt {
        async fn send_audio(&self, payload: &[u8]) -> Result<(), SttError> {
            self.forwarded.lock().await.push(payload.to_vec());
            Ok(())
        }

        async fn next_fragment(&self) -> Result<Option<TranscriptFragment>, SttError> {
            let next = self.fragments.lock().await.pop_front();
            match next {
                Some(fragment) => fragment,
                None => std::future::pending().await,
            }
        }

        async fn finish(&self) -> Result<(), SttError> {
            *self.finished.lock().await = true;
            Ok(())
        }
    }

    struct FixedConnector {
        stream: Arc<ScriptedStt>,
        fail: bool,
    }

    #[async_trait]
    impl TranscriptionConnector for FixedConnector {
        async fn connect(&self) -> Result<Arc<dyn TranscriptionStream>, SttError> {
            if self.fail {
                return Err(SttError::Connect("no route to provider".to_string()));
            }
            Ok(self.stream.clone())
        }
    }

    /// Records every synthesized text; the "audio" is the UTF-8 text itself
    /// so tests can assert on what was spoken.
    #[derive(Default)]
    struct RecordingSynth {
        spoken: Mutex<Vec<String>>,
        fail_times: Mutex<u32>,
    }

    impl RecordingSynth {
        async fn spoken(&self) -> Vec<String> {
            self.spoken.lock().await.clone()
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for RecordingSynth {
        async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError> {
            let mut fail_times = self.fail_times.lock().await;
            if *fail_times > 0 {
                *fail_times -= 1;
                return Err(TtsError::Synthesis("provider 500".to_string()));
            }
            self.spoken.lock().await.push(text.to_string());
            Ok(text.as_bytes().to_vec())
        }
    }

    #[derive(Default)]
    struct RecordingControl {
        transfers: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl RecordingControl {
        async fn transfers(&self) -> Vec<(String, String)> {
            self.transfers.lock().await.clone()
        }
    }

    #[async_trait]
    impl CallControl for RecordingControl {
        async fn transfer(&self, call_id: &str, destination: &str) -> Result<(), TransportError> {
            self.transfers.lock().await.push((call_id.to_string(), destination.to_string()));
            if self.fail {
                return Err(TransportError::Transfer("control channel 502".to_string()));
            }
            Ok(())
        }
    }

    struct ScriptedLlm {
        replies: Mutex<VecDeque<Result<AssistantReply, AgentError>>>,
        instructions: Mutex<Vec<String>>,
    }

    impl ScriptedLlm {
        fn with_script(replies: Vec<Result<AssistantReply, AgentError>>) -> Arc<Self> {
            Self {
                replies: Mutex::new(replies.into()),
                instructions: Mutex::new(Vec::new()),
            }
            .into()
        }

        async fn instructions(&self) -> Vec<String> {
            self.instructions.lock().await.clone()
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete(
            &self,
            system_instruction: &str,
            _history: &[Message],
        ) -> Result<AssistantReply, AgentError> {
            self.instructions.lock().await.push(system_instruction.to_string());
            self.replies
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Ok(AssistantReply::text_only("Anything else?")))
        }
    }

    struct Harness {
        relay: CallRelay,
        registry: Arc<SessionRegistry>,
        stt: Arc<ScriptedStt>,
        synth: Arc<RecordingSynth>,
        control: Arc<RecordingControl>,
    }

    fn harness(llm: Arc<ScriptedLlm>, stt: Arc<ScriptedStt>) -> Harness {
        harness_with(llm, stt, RecordingControl::default(), false)
    }

    fn harness_with(
        llm: Arc<ScriptedLlm>,
        stt: Arc<ScriptedStt>,
        control: RecordingControl,
        fail_connect: bool,
    ) -> Harness {
        let registry = Arc::new(SessionRegistry::new());
        let engine = Arc::new(ConversationEngine::new(
            llm,
            ToolExecutor::new(Arc::new(Menu::builtin())),
        ));
        let synth = Arc::new(RecordingSynth::default());
        let control = Arc::new(control);

        let relay = CallRelay::new(
            registry.clone(),
            engine,
            Arc::new(FixedConnector { stream: stt.clone(), fail: fail_connect }),
            synth.clone(),
            control.clone(),
            RelayConfig {
                greeting: "Welcome to DineLine Pizza! What would you like to order today?"
                    .to_string(),
                transfer_notice: "One moment, connecting you to a team member.".to_string(),
                transfer_destination: "+15550100".to_string(),
            },
        );

        Harness { relay, registry, stt, synth, control }
    }

    fn started(call_id: &str) -> Result<Option<CallEvent>, TransportError> {
        Ok(Some(CallEvent::Started {
            call_id: call_id.to_string(),
            stream_id: format!("MZ-{call_id}"),
        }))
    }

    fn final_fragment(text: &str) -> Result<Option<TranscriptFragment>, SttError> {
        Ok(Some(TranscriptFragment { text: text.to_string(), is_final: true, speech_final: true }))
    }

    fn call(id: &str, action: ActionRequest) -> ToolInvocation {
        ToolInvocation { id: id.to_string(), action }
    }

    #[tokio::test]
    async fn call_stop_tears_down_and_closes_transcription() {
        let llm = ScriptedLlm::with_script(Vec::new());
        let stt = ScriptedStt::with_script(Vec::new());
        let harness = harness(llm, stt.clone());

        let media = ScriptedMedia::with_script(vec![
            started("CA-stop"),
            Ok(Some(CallEvent::Audio(vec![1, 2, 3]))),
            Ok(Some(CallEvent::Audio(vec![4, 5]))),
            Ok(Some(CallEvent::Stopped)),
        ]);

        harness.relay.run_call(media.clone()).await.expect("call runs");

        assert!(harness.stt.finished().await, "transcription connection must be closed");
        assert_eq!(harness.stt.forwarded().await, vec![vec![1, 2, 3], vec![4, 5]]);
        assert_eq!(harness.registry.active_calls(), 0, "session must be removed");
        assert_eq!(harness.synth.spoken().await.len(), 1, "only the greeting is spoken");
    }

    #[tokio::test]
    async fn finalized_utterance_runs_one_turn_and_speaks_the_reply() {
        let llm = ScriptedLlm::with_script(vec![
            Ok(AssistantReply {
                text: String::new(),
                calls: vec![call(
                    "call-1",
                    ActionRequest::AddToCart {
                        item_id: "pepperoni_small".to_string(),
                        quantity: 2,
                    },
                )],
            }),
            Ok(AssistantReply::text_only("Two small pepperoni pizzas. Anything else?")),
        ]);
        let stt = ScriptedStt::with_script(vec![
            Ok(Some(TranscriptFragment {
                text: "two small".to_string(),
                is_final: true,
                speech_final: false,
            })),
            final_fragment("two small pepperoni pizzas please"),
            Ok(None),
        ]);
        let harness = harness(llm.clone(), stt);
        let media = ScriptedMedia::with_script(vec![started("CA-order")]);

        harness.relay.run_call(media.clone()).await.expect("call runs");

        let spoken = harness.synth.spoken().await;
        assert_eq!(spoken.len(), 2);
        assert!(spoken[0].contains("Welcome to DineLine"));
        assert_eq!(spoken[1], "Two small pepperoni pizzas. Anything else?");
        assert_eq!(media.sent().await.len(), 2);

        // the post-tool invocation saw the mutated cart snapshot
        let instructions = llm.instructions().await;
        assert_eq!(instructions.len(), 2);
        assert!(instructions[1].contains("$20.00"));

        assert!(harness.stt.finished().await);
        assert_eq!(harness.control.transfers().await.len(), 0);
    }

    #[tokio::test]
    async fn handoff_speaks_only_the_notice_and_transfers_exactly_once() {
        let llm = ScriptedLlm::with_script(vec![
            Ok(AssistantReply {
                text: String::new(),
                calls: vec![call(
                    "call-1",
                    ActionRequest::RequestHandoff { reason: "caller asked".to_string() },
                )],
            }),
            Ok(AssistantReply::text_only("Connecting you now.")),
        ]);
        let stt = ScriptedStt::with_script(vec![final_fragment("let me talk to a manager")]);
        let harness = harness(llm, stt);
        let media = ScriptedMedia::with_script(vec![started("CA-handoff")]);

        harness.relay.run_call(media).await.expect("call runs");

        let spoken = harness.synth.spoken().await;
        assert_eq!(spoken.len(), 2);
        assert!(spoken[1].contains("connecting you"));
        assert!(!spoken.iter().any(|text| text == "Connecting you now."));

        assert_eq!(
            harness.control.transfers().await,
            vec![("CA-handoff".to_string(), "+15550100".to_string())]
        );
        assert!(harness.stt.finished().await);
        assert_eq!(harness.registry.active_calls(), 0);
    }

    #[tokio::test]
    async fn transfer_failure_ends_with_spoken_apology_not_silence() {
        let llm = ScriptedLlm::with_script(vec![Ok(AssistantReply {
            text: String::new(),
            calls: vec![call(
                "call-1",
                ActionRequest::RequestHandoff { reason: "frustrated".to_string() },
            )],
        })]);
        let stt = ScriptedStt::with_script(vec![final_fragment("get me a human")]);
        let harness = harness_with(
            llm,
            stt,
            RecordingControl { fail: true, ..RecordingControl::default() },
            false,
        );
        let media = ScriptedMedia::with_script(vec![started("CA-tf")]);

        harness.relay.run_call(media).await.expect("call runs");

        let spoken = harness.synth.spoken().await;
        assert!(spoken.last().expect("something spoken").contains("technical trouble"));
        assert_eq!(harness.control.transfers().await.len(), 1);
        assert!(harness.stt.finished().await);
    }

    #[tokio::test]
    async fn empty_reply_text_never_reaches_the_synthesizer() {
        let llm = ScriptedLlm::with_script(vec![Ok(AssistantReply::text_only("   "))]);
        let stt = ScriptedStt::with_script(vec![final_fragment("mumble"), Ok(None)]);
        let harness = harness(llm, stt);
        let media = ScriptedMedia::with_script(vec![started("CA-empty")]);

        harness.relay.run_call(media).await.expect("call runs");

        let spoken = harness.synth.spoken().await;
        assert_eq!(spoken.len(), 1, "only the greeting; whitespace reply is skipped");
    }

    #[tokio::test]
    async fn synthesis_failure_is_retried_once_then_skipped() {
        let llm = ScriptedLlm::with_script(vec![Ok(AssistantReply::text_only("We have pizza."))]);
        let stt = ScriptedStt::with_script(vec![final_fragment("what do you have"), Ok(None)]);
        let harness = harness(llm, stt);
        // first attempt of the greeting fails; retry succeeds
        *harness.synth.fail_times.lock().await = 1;
        let media = ScriptedMedia::with_script(vec![started("CA-tts")]);

        harness.relay.run_call(media).await.expect("call runs");

        let spoken = harness.synth.spoken().await;
        assert_eq!(spoken.len(), 2);
        assert!(spoken[0].contains("Welcome"));
    }

    #[tokio::test]
    async fn reasoning_failure_apologizes_and_keeps_listening() {
        let llm = ScriptedLlm::with_script(vec![
            Err(AgentError::ReasoningUnavailable("timeout".to_string())),
            Ok(AssistantReply::text_only("We have pepperoni and cheese.")),
        ]);
        let stt = ScriptedStt::with_script(vec![
            final_fragment("what pizzas do you have"),
            final_fragment("hello, what pizzas do you have"),
            Ok(None),
        ]);
        let harness = harness(llm, stt);
        let media = ScriptedMedia::with_script(vec![started("CA-retry")]);

        harness.relay.run_call(media).await.expect("call runs");

        let spoken = harness.synth.spoken().await;
        assert_eq!(spoken.len(), 3);
        assert!(spoken[1].contains("say that again"));
        assert_eq!(spoken[2], "We have pepperoni and cheese.");
    }

    #[tokio::test]
    async fn transcription_connect_failure_is_fatal_but_spoken() {
        let llm = ScriptedLlm::with_script(Vec::new());
        let stt = ScriptedStt::with_script(Vec::new());
        let harness = harness_with(llm, stt, RecordingControl::default(), true);
        let media = ScriptedMedia::with_script(vec![started("CA-nostt")]);

        let result = harness.relay.run_call(media).await;

        assert!(result.is_err());
        let spoken = harness.synth.spoken().await;
        assert_eq!(spoken.len(), 1);
        assert!(spoken[0].contains("technical trouble"));
        assert_eq!(harness.registry.active_calls(), 0, "no session was registered");
    }
}
