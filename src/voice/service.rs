//! Rate-limited voice generation.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::backend::{Audio, SpeechBackend};
use super::error::VoiceError;
use crate::config::PluginConfig;
use crate::ratelimit::{RateLimitKey, RateLimiter};

/// Gates calls to the speech backend behind the rate limiter.
///
/// The configured limit is read on every call, so a config swap through
/// [`VoiceService::set_config`] applies to the very next request.
pub struct VoiceService {
    limiter: Arc<RateLimiter>,
    backend: Arc<dyn SpeechBackend>,
    config: RwLock<PluginConfig>,
}

impl VoiceService {
    /// Create a new voice service.
    pub fn new(
        limiter: Arc<RateLimiter>,
        backend: Arc<dyn SpeechBackend>,
        config: PluginConfig,
    ) -> Self {
        Self {
            limiter,
            backend,
            config: RwLock::new(config),
        }
    }

    /// Update the plugin configuration.
    pub fn set_config(&self, config: PluginConfig) {
        let mut cfg = self.config.write();
        *cfg = config;
    }

    /// Get the current configuration.
    pub fn config(&self) -> PluginConfig {
        self.config.read().clone()
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Synthesize `text` for a message from `group_id` (or a private chat).
    ///
    /// Text is validated before the rate limiter is consulted, so malformed
    /// requests do not use up budget. An accepted check makes exactly one
    /// backend call; a denied check makes none.
    #[instrument(
        skip(self, text),
        fields(
            key = %RateLimitKey::for_scope(group_id),
            request_id = %Uuid::new_v4()
        )
    )]
    pub async fn generate(&self, group_id: Option<i64>, text: &str) -> Result<Audio, VoiceError> {
        let (limit, max_len) = {
            let cfg = self.config.read();
            (cfg.rate_limit, cfg.max_text_length)
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(VoiceError::EmptyText);
        }

        let len = text.chars().count();
        if len > max_len {
            debug!(len, max = max_len, "Rejecting over-long text");
            return Err(VoiceError::TextTooLong { len, max: max_len });
        }

        let key = RateLimitKey::for_scope(group_id);
        if !self.limiter.check(key.as_str(), limit) {
            info!(key = %key, limit, "Voice request rate limited");
            return Err(VoiceError::RateLimited { key });
        }

        match self.backend.synthesize(text).await {
            Ok(audio) => {
                info!(key = %key, url = %audio.url, "Voice generated");
                Ok(audio)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Voice generation failed");
                Err(e)
            }
        }
    }

    /// Remaining budget for the scope, `-1` when unlimited.
    pub fn remaining(&self, group_id: Option<i64>) -> i64 {
        let limit = self.config.read().rate_limit;
        let key = RateLimitKey::for_scope(group_id);
        self.limiter.get_remaining(key.as_str(), limit)
    }
}
