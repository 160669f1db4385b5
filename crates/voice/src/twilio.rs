use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use dineline_core::config::TelephonyConfig;

use crate::events::CallEvent;
use crate::transport::{CallControl, TransportError};

/// One inbound Media Streams WebSocket message. Twilio sends `connected`,
/// `start`, `media`, `mark`, and `stop` events; only start/media/stop are
/// meaningful to the relay.
#[derive(Debug, Deserialize)]
struct StreamMessage {
    event: String,
    #[serde(default)]
    start: Option<StartPayload>,
    #[serde(default)]
    media: Option<MediaPayload>,
}

#[derive(Debug, Deserialize)]
struct StartPayload {
    #[serde(rename = "callSid")]
    call_sid: String,
    #[serde(rename = "streamSid")]
    stream_sid: String,
}

#[derive(Debug, Deserialize)]
struct MediaPayload {
    /// Base64-encoded mu-law audio.
    payload: String,
}

/// Decodes one Media Streams text frame into a call event. Returns
/// `Ok(None)` for frames the relay does not act on (`connected`, `mark`).
pub fn parse_stream_message(raw: &str) -> Result<Option<CallEvent>, TransportError> {
    let message: StreamMessage = serde_json::from_str(raw)
        .map_err(|error| TransportError::Receive(format!("bad media-stream frame: {error}")))?;

    match message.event.as_str() {
        "start" => {
            let start = message.start.ok_or_else(|| {
                TransportError::Receive("start frame missing start payload".to_string())
            })?;
            Ok(Some(CallEvent::Started { call_id: start.call_sid, stream_id: start.stream_sid }))
        }
        "media" => {
            let media = message.media.ok_or_else(|| {
                TransportError::Receive("media frame missing media payload".to_string())
            })?;
            let payload = BASE64.decode(media.payload.as_bytes()).map_err(|error| {
                TransportError::Receive(format!("bad media payload encoding: {error}"))
            })?;
            Ok(Some(CallEvent::Audio(payload)))
        }
        "stop" => Ok(Some(CallEvent::Stopped)),
        other => {
            debug!(event_name = "voice.twilio.frame_ignored", frame = other, "ignoring frame");
            Ok(None)
        }
    }
}

/// Encodes outbound audio as a Media Streams `media` frame for `stream_sid`.
pub fn media_frame(stream_sid: &str, audio: &[u8]) -> String {
    json!({
        "event": "media",
        "streamSid": stream_sid,
        "media": { "payload": BASE64.encode(audio) },
    })
    .to_string()
}

/// Call-control client over the Twilio REST API. Redirecting a live call is
/// an update to the call resource with `<Dial>` TwiML.
pub struct TwilioCallControl {
    http: reqwest::Client,
    base_url: String,
    account_sid: String,
    auth_token: SecretString,
}

impl TwilioCallControl {
    pub fn new(config: &TelephonyConfig) -> Self {
        Self::with_base_url(config, "https://api.twilio.com")
    }

    pub fn with_base_url(config: &TelephonyConfig, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
        }
    }
}

#[async_trait]
impl CallControl for TwilioCallControl {
    async fn transfer(&self, call_id: &str, destination: &str) -> Result<(), TransportError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Calls/{}.json",
            self.base_url, self.account_sid, call_id
        );
        let twiml = format!("<Response><Dial>{destination}</Dial></Response>");

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&[("Twiml", twiml.as_str())])
            .send()
            .await
            .map_err(|error| TransportError::Transfer(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Transfer(format!(
                "call update returned status {status}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;

    use crate::events::CallEvent;

    use super::{media_frame, parse_stream_message};

    #[test]
    fn parses_start_frame_into_started_event() {
        let raw = r#"{
            "event": "start",
            "sequenceNumber": "1",
            "start": { "callSid": "CA123", "streamSid": "MZ456", "tracks": ["inbound"] }
        }"#;

        let event = parse_stream_message(raw).expect("frame parses").expect("event emitted");
        assert_eq!(
            event,
            CallEvent::Started { call_id: "CA123".to_string(), stream_id: "MZ456".to_string() }
        );
    }

    #[test]
    fn parses_media_frame_and_decodes_payload() {
        let encoded = BASE64.encode([0x7fu8, 0x00, 0xff]);
        let raw = format!(r#"{{ "event": "media", "media": {{ "payload": "{encoded}" }} }}"#);

        let event = parse_stream_message(&raw).expect("frame parses").expect("event emitted");
        assert_eq!(event, CallEvent::Audio(vec![0x7f, 0x00, 0xff]));
    }

    #[test]
    fn connected_and_mark_frames_are_ignored() {
        assert_eq!(
            parse_stream_message(r#"{ "event": "connected", "protocol": "Call" }"#)
                .expect("frame parses"),
            None
        );
        assert_eq!(
            parse_stream_message(r#"{ "event": "mark" }"#).expect("frame parses"),
            None
        );
    }

    #[test]
    fn stop_frame_maps_to_stopped() {
        let event = parse_stream_message(r#"{ "event": "stop" }"#)
            .expect("frame parses")
            .expect("event emitted");
        assert_eq!(event, CallEvent::Stopped);
    }

    #[test]
    fn malformed_frame_is_a_receive_error() {
        assert!(parse_stream_message("not json").is_err());
        assert!(parse_stream_message(r#"{ "event": "media" }"#).is_err());
    }

    #[test]
    fn media_frame_round_trips_outbound_audio() {
        let frame = media_frame("MZ456", &[1, 2, 3]);
        let event = parse_stream_message(&frame).expect("frame parses").expect("event emitted");
        assert_eq!(event, CallEvent::Audio(vec![1, 2, 3]));
    }
}
