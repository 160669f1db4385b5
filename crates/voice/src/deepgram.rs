use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use dineline_core::config::TranscriptionConfig;

use crate::events::TranscriptFragment;
use crate::stt::{SttError, TranscriptionConnector, TranscriptionStream};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Connector for the Deepgram live-transcription WebSocket API. Opens one
/// fresh socket per call, configured for the transport's mu-law stream.
pub struct DeepgramTranscription {
    endpoint: String,
    api_key: SecretString,
    sample_rate: u32,
}

impl DeepgramTranscription {
    pub fn new(config: &TranscriptionConfig) -> Result<Self, SttError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            SttError::Connect("transcription.api_key is not configured".to_string())
        })?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            sample_rate: config.sample_rate,
        })
    }

    fn listen_url(&self) -> String {
        format!(
            "{}?encoding=mulaw&sample_rate={}&model=nova-2&punctuate=true\
             &interim_results=true&endpointing=300",
            self.endpoint, self.sample_rate
        )
    }
}

#[async_trait]
impl TranscriptionConnector for DeepgramTranscription {
    async fn connect(&self) -> Result<Arc<dyn TranscriptionStream>, SttError> {
        let mut request = self
            .listen_url()
            .into_client_request()
            .map_err(|error| SttError::Connect(error.to_string()))?;

        let auth = HeaderValue::from_str(&format!("Token {}", self.api_key.expose_secret()))
            .map_err(|error| SttError::Connect(error.to_string()))?;
        request.headers_mut().insert("Authorization", auth);

        let (socket, _response) = connect_async(request)
            .await
            .map_err(|error| SttError::Connect(error.to_string()))?;

        let (sink, source) = socket.split();
        Ok(Arc::new(DeepgramStream {
            sink: Mutex::new(sink),
            source: Mutex::new(source),
        }))
    }
}

struct DeepgramStream {
    sink: Mutex<WsSink>,
    source: Mutex<WsSource>,
}

#[async_trait]
impl TranscriptionStream for DeepgramStream {
    async fn send_audio(&self, payload: &[u8]) -> Result<(), SttError> {
        self.sink
            .lock()
            .await
            .send(WsMessage::binary(payload.to_vec()))
            .await
            .map_err(|error| SttError::Send(error.to_string()))
    }

    async fn next_fragment(&self) -> Result<Option<TranscriptFragment>, SttError> {
        let mut source = self.source.lock().await;

        loop {
            let message = match source.next().await {
                None => return Ok(None),
                Some(Err(error)) => return Err(SttError::Receive(error.to_string())),
                Some(Ok(message)) => message,
            };

            match message {
                WsMessage::Text(raw) => {
                    if let Some(fragment) = parse_live_message(raw.as_str())? {
                        return Ok(Some(fragment));
                    }
                }
                WsMessage::Close(_) => return Ok(None),
                other => {
                    debug!(
                        event_name = "voice.deepgram.frame_ignored",
                        frame = ?other,
                        "ignoring non-text frame"
                    );
                }
            }
        }
    }

    async fn finish(&self) -> Result<(), SttError> {
        let mut sink = self.sink.lock().await;
        sink.send(WsMessage::text(r#"{"type":"CloseStream"}"#.to_string()))
            .await
            .map_err(|error| SttError::Send(error.to_string()))?;
        sink.close().await.map_err(|error| SttError::Send(error.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct LiveMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    is_final: bool,
    #[serde(default)]
    speech_final: bool,
    #[serde(default)]
    channel: Option<LiveChannel>,
}

#[derive(Debug, Deserialize)]
struct LiveChannel {
    alternatives: Vec<LiveAlternative>,
}

#[derive(Debug, Deserialize)]
struct LiveAlternative {
    transcript: String,
}

/// Maps one live-API text message to a transcript fragment. Non-result
/// messages (metadata, utterance markers) yield `None`.
fn parse_live_message(raw: &str) -> Result<Option<TranscriptFragment>, SttError> {
    let message: LiveMessage = serde_json::from_str(raw)
        .map_err(|error| SttError::Receive(format!("bad live message: {error}")))?;

    if message.kind != "Results" {
        return Ok(None);
    }

    let transcript = message
        .channel
        .and_then(|channel| channel.alternatives.into_iter().next())
        .map(|alternative| alternative.transcript)
        .unwrap_or_default();

    Ok(Some(TranscriptFragment {
        text: transcript,
        is_final: message.is_final,
        speech_final: message.speech_final,
    }))
}
