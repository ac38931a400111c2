//! Routes chat events to the voice service.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::event::{ChatEvent, Reply};
use super::permission::check_permission;
use crate::voice::{VoiceCommand, VoiceService};

/// Turns incoming chat events into replies.
pub struct Dispatcher {
    voice: Arc<VoiceService>,
}

impl Dispatcher {
    /// Create a new dispatcher over the given voice service.
    pub fn new(voice: Arc<VoiceService>) -> Self {
        Self { voice }
    }

    pub fn voice(&self) -> &Arc<VoiceService> {
        &self.voice
    }

    /// Handle one chat event.
    ///
    /// Returns `None` when the event is not for this plugin or the sender is
    /// not permitted to use it; such events are ignored without a reply.
    #[instrument(
        skip(self, event),
        fields(
            message_id = event.message_id,
            user_id = event.user_id,
            group_id = ?event.group_id
        )
    )]
    pub async fn handle(&self, event: &ChatEvent) -> Option<Reply> {
        let config = self.voice.config();

        if !config.enabled {
            return None;
        }

        let command = VoiceCommand::parse(&event.text, &config.command)?;

        let permission = check_permission(&config, event);
        if !permission.is_allowed() {
            debug!(?permission, "Ignoring command from unpermitted sender");
            return None;
        }

        if command.is_empty() {
            return Some(Reply::text(event, format!("用法: /{} <文字>", config.command)));
        }

        let reply = match self.voice.generate(event.group_id, &command.text).await {
            Ok(audio) => Reply::audio(event, audio.url),
            Err(e) => {
                if e.is_rejection() {
                    debug!(error = %e, "Voice request refused before reaching the API");
                } else {
                    warn!(error = %e, "Voice request failed at the API");
                }
                Reply::text(event, e.user_message())
            }
        };

        info!(body = ?reply.body, "Reply ready");
        Some(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::event::ReplyBody;
    use crate::config::PluginConfig;
    use crate::ratelimit::RateLimiter;
    use crate::voice::{Audio, SpeechBackend, VoiceError};
    use async_trait::async_trait;

    struct EchoBackend;

    #[async_trait]
    impl SpeechBackend for EchoBackend {
        async fn synthesize(&self, text: &str) -> Result<Audio, VoiceError> {
            Ok(Audio {
                url: format!("https://cdn.example.com/{}", text),
            })
        }
    }

    fn dispatcher(config: PluginConfig) -> Dispatcher {
        let voice = VoiceService::new(Arc::new(RateLimiter::new()), Arc::new(EchoBackend), config);
        Dispatcher::new(Arc::new(voice))
    }

    fn group_event(text: &str) -> ChatEvent {
        ChatEvent {
            message_id: 100,
            user_id: 1,
            group_id: Some(42),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_command_produces_audio() {
        let dispatcher = dispatcher(PluginConfig::default());

        let reply = dispatcher.handle(&group_event("/曼波 hello")).await.unwrap();
        assert_eq!(
            reply.body,
            ReplyBody::Audio {
                url: "https://cdn.example.com/hello".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_non_command_is_ignored() {
        let dispatcher = dispatcher(PluginConfig::default());
        assert!(dispatcher.handle(&group_event("just chatting")).await.is_none());
    }

    #[tokio::test]
    async fn test_disabled_plugin_is_silent() {
        let dispatcher = dispatcher(PluginConfig {
            enabled: false,
            ..PluginConfig::default()
        });
        assert!(dispatcher.handle(&group_event("/曼波 hello")).await.is_none());
    }

    #[tokio::test]
    async fn test_unpermitted_sender_is_silent() {
        let dispatcher = dispatcher(PluginConfig {
            blocked_groups: vec![42],
            ..PluginConfig::default()
        });
        assert!(dispatcher.handle(&group_event("/曼波 hello")).await.is_none());
    }

    #[tokio::test]
    async fn test_bare_command_gets_usage() {
        let dispatcher = dispatcher(PluginConfig::default());

        let reply = dispatcher.handle(&group_event("/曼波")).await.unwrap();
        assert_eq!(
            reply.body,
            ReplyBody::Text {
                text: "用法: /曼波 <文字>".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_rate_limited_reply() {
        let dispatcher = dispatcher(PluginConfig {
            rate_limit: 1,
            ..PluginConfig::default()
        });

        assert!(matches!(
            dispatcher.handle(&group_event("/曼波 one")).await.unwrap().body,
            ReplyBody::Audio { .. }
        ));

        let reply = dispatcher.handle(&group_event("/曼波 two")).await.unwrap();
        match reply.body {
            ReplyBody::Text { text } => assert!(text.contains("rate limited")),
            other => panic!("expected text reply, got {:?}", other),
        }
    }
}
