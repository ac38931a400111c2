//! HTTP text-to-speech backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::backend::{Audio, SpeechBackend};
use super::error::VoiceError;
use crate::config::ApiConfig;
use crate::error::Result;

/// Status code the API uses for success in its response body.
const API_OK: i64 = 200;

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
}

/// Body returned by the text-to-speech API.
#[derive(Debug, Deserialize)]
struct SynthesisResponse {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl SynthesisResponse {
    fn into_audio(self) -> std::result::Result<Audio, VoiceError> {
        if self.code != API_OK {
            return Err(VoiceError::Api {
                status: self.code,
                message: self.msg.unwrap_or_default(),
            });
        }

        match self.url {
            Some(url) if !url.trim().is_empty() => Ok(Audio { url }),
            _ => Err(VoiceError::InvalidResponse(
                "response carried no audio url".to_string(),
            )),
        }
    }
}

/// Calls a remote text-to-speech API over HTTP.
pub struct HttpSpeechBackend {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpSpeechBackend {
    /// Build a backend from the API settings.
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(api.timeout()).build()?;

        Ok(Self {
            client,
            url: api.url.clone(),
            token: api.token.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SpeechBackend for HttpSpeechBackend {
    async fn synthesize(&self, text: &str) -> std::result::Result<Audio, VoiceError> {
        let mut request = self.client.post(&self.url).json(&SynthesisRequest { text });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), url = %self.url, "Speech API returned an error status");
            return Err(VoiceError::Api {
                status: status.as_u16() as i64,
                message: body,
            });
        }

        let body: SynthesisResponse = response.json().await?;
        debug!(code = body.code, "Speech API responded");
        body.into_audio()
    }
}
