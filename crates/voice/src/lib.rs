//! Voice surface of DineLine: the per-call audio relay and its provider
//! adapters.
//!
//! One call is one [`relay::CallRelay::run_call`] invocation bridging three
//! collaborators behind traits:
//! - the telephony media stream ([`transport::MediaStream`]) with its
//!   out-of-band control channel ([`transport::CallControl`]),
//! - a streaming transcription source ([`stt::TranscriptionStream`]),
//! - a speech-synthesis sink ([`tts::SpeechSynthesizer`]).
//!
//! Concrete adapters: Twilio Media Streams framing and REST call control
//! (`twilio`), Deepgram live transcription (`deepgram`), and ElevenLabs
//! synthesis (`elevenlabs`). Session ownership lives in
//! [`registry::SessionRegistry`].

pub mod deepgram;
pub mod elevenlabs;
pub mod events;
pub mod registry;
pub mod relay;
pub mod stt;
pub mod transport;
pub mod tts;
pub mod twilio;

pub use events::{CallEvent, TranscriptFragment};
pub use registry::SessionRegistry;
pub use relay::{CallRelay, RelayConfig, RelayError};
pub use stt::{SttError, TranscriptionConnector, TranscriptionStream};
pub use transport::{CallControl, MediaStream, NoopCallControl, TransportError};
pub use tts::{SpeechSynthesizer, TtsError};
