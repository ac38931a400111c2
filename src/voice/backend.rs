//! Speech backend trait for abstracting the text-to-speech API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::VoiceError;

/// A synthesized voice clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audio {
    /// Where the chat platform can fetch the clip
    pub url: String,
}

/// Trait for text-to-speech implementations.
///
/// This trait abstracts over the HTTP API and test doubles so the voice
/// service can be exercised without a network.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Turn `text` into audio.
    async fn synthesize(&self, text: &str) -> Result<Audio, VoiceError>;
}
