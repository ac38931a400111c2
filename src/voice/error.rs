//! Failures of a single voice generation request.

use thiserror::Error;

use crate::ratelimit::RateLimitKey;

/// Errors surfaced to the user who asked for a voice clip.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoiceError {
    /// The key's budget for the current window is used up
    #[error("rate limited for {key}")]
    RateLimited { key: RateLimitKey },

    #[error("no text to synthesize")]
    EmptyText,

    #[error("text is {len} characters, limit is {max}")]
    TextTooLong { len: usize, max: usize },

    /// The API answered but reported a failure
    #[error("API error (status {status}): {message}")]
    Api { status: i64, message: String },

    /// The API answered with something we could not use
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// The request never got an answer
    #[error("transport error: {0}")]
    Transport(String),
}

impl VoiceError {
    /// Text shown to the user in the chat.
    pub fn user_message(&self) -> String {
        match self {
            VoiceError::RateLimited { .. } => "曼波累了，请稍后再试 (rate limited)".to_string(),
            VoiceError::EmptyText => "请在命令后输入要合成的文字".to_string(),
            VoiceError::TextTooLong { max, .. } => {
                format!("文字太长了，最多 {} 个字", max)
            }
            VoiceError::Api { .. } | VoiceError::InvalidResponse(_) | VoiceError::Transport(_) => {
                "语音生成失败，请稍后再试".to_string()
            }
        }
    }

    /// Whether the request was refused before reaching the API.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            VoiceError::RateLimited { .. } | VoiceError::EmptyText | VoiceError::TextTooLong { .. }
        )
    }
}

impl From<reqwest::Error> for VoiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            VoiceError::InvalidResponse(err.to_string())
        } else {
            VoiceError::Transport(err.to_string())
        }
    }
}
