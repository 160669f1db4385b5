use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use dineline_voice::events::CallEvent;
use dineline_voice::transport::{MediaStream, TransportError};
use dineline_voice::twilio::{media_frame, parse_stream_message};
use dineline_voice::{CallRelay, SessionRegistry};

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<CallRelay>,
    pub registry: Arc<SessionRegistry>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/call", get(call_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub active_calls: usize,
    pub checked_at: String,
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let payload = HealthResponse {
        status: "ready",
        active_calls: state.registry.active_calls(),
        checked_at: Utc::now().to_rfc3339(),
    };
    (StatusCode::OK, Json(payload))
}

/// Media Streams entry point: Twilio opens one WebSocket per call.
async fn call_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        info!(event_name = "ingress.call.connected", "media stream connected");
        let transport = Arc::new(TwilioMediaStream::new(socket));
        if let Err(error) = state.relay.run_call(transport).await {
            warn!(event_name = "ingress.call.failed", error = %error, "call ended with error");
        }
    })
}

/// Adapts one Media Streams WebSocket into the relay's transport trait.
/// The stream sid is learned from the `start` frame and used to address
/// outbound media frames.
struct TwilioMediaStream {
    source: Mutex<SplitStream<WebSocket>>,
    sink: Mutex<SplitSink<WebSocket, Message>>,
    stream_sid: Mutex<Option<String>>,
}

impl TwilioMediaStream {
    fn new(socket: WebSocket) -> Self {
        let (sink, source) = socket.split();
        Self { source: Mutex::new(source), sink: Mutex::new(sink), stream_sid: Mutex::new(None) }
    }
}

#[async_trait]
impl MediaStream for TwilioMediaStream {
    async fn next_event(&self) -> Result<Option<CallEvent>, TransportError> {
        let mut source = self.source.lock().await;

        loop {
            let message = match source.next().await {
                None => return Ok(None),
                Some(Err(error)) => return Err(TransportError::Receive(error.to_string())),
                Some(Ok(message)) => message,
            };

            match message {
                Message::Text(raw) => {
                    let Some(event) = parse_stream_message(raw.as_str())? else {
                        continue;
                    };
                    if let CallEvent::Started { stream_id, .. } = &event {
                        *self.stream_sid.lock().await = Some(stream_id.clone());
                    }
                    return Ok(Some(event));
                }
                Message::Close(_) => return Ok(None),
                other => {
                    debug!(
                        event_name = "ingress.call.frame_ignored",
                        frame = ?other,
                        "ignoring non-text frame"
                    );
                }
            }
        }
    }

    async fn send_audio(&self, payload: &[u8]) -> Result<(), TransportError> {
        let stream_sid = self.stream_sid.lock().await.clone().ok_or_else(|| {
            TransportError::Send("outbound audio before stream start".to_string())
        })?;

        let frame = media_frame(&stream_sid, payload);
        self.sink
            .lock()
            .await
            .send(Message::Text(frame.into()))
            .await
            .map_err(|error| TransportError::Send(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    use dineline_agent::{ConversationEngine, ToolExecutor};
    use dineline_core::config::AppConfig;
    use dineline_core::domain::menu::Menu;
    use dineline_voice::deepgram::DeepgramTranscription;
    use dineline_voice::elevenlabs::ElevenLabsSynthesizer;
    use dineline_voice::twilio::TwilioCallControl;
    use dineline_voice::{CallRelay, RelayConfig, SessionRegistry};

    use super::{router, AppState};

    fn test_state() -> AppState {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("sk-test".to_string().into());
        config.transcription.api_key = Some("dg-test".to_string().into());
        config.synthesis.api_key = Some("el-test".to_string().into());
        config.telephony.account_sid = "AC123".to_string();
        config.telephony.auth_token = "token".to_string().into();
        config.telephony.transfer_destination = "+15550100".to_string();

        let llm = dineline_agent::OpenAiChatClient::new(&config.llm).expect("client builds");
        let engine = Arc::new(ConversationEngine::new(
            Arc::new(llm),
            ToolExecutor::new(Arc::new(Menu::builtin())),
        ));
        let registry = Arc::new(SessionRegistry::new());
        let relay = Arc::new(CallRelay::new(
            registry.clone(),
            engine,
            Arc::new(DeepgramTranscription::new(&config.transcription).expect("adapter builds")),
            Arc::new(ElevenLabsSynthesizer::new(&config.synthesis).expect("adapter builds")),
            Arc::new(TwilioCallControl::new(&config.telephony)),
            RelayConfig {
                greeting: config.agent.greeting.clone(),
                transfer_notice: config.agent.transfer_notice.clone(),
                transfer_destination: config.telephony.transfer_destination.clone(),
            },
        ));

        AppState { relay, registry }
    }

    #[tokio::test]
    async fn healthz_reports_ready_with_zero_active_calls() {
        let app = router(test_state());

        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(payload["status"], "ready");
        assert_eq!(payload["active_calls"], 0);
    }

    #[tokio::test]
    async fn call_endpoint_requires_websocket_upgrade() {
        let app = router(test_state());

        let response = app
            .oneshot(Request::builder().uri("/call").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        // a plain GET without upgrade headers is rejected
        assert_ne!(response.status(), StatusCode::OK);
    }
}
