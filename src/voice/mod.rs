//! Voice generation: command parsing, the speech API, and the rate-limited gate.

mod backend;
mod command;
mod error;
mod http;
mod service;

pub use backend::{Audio, SpeechBackend};
pub use command::VoiceCommand;
pub use error::VoiceError;
pub use http::HttpSpeechBackend;
pub use service::VoiceService;
