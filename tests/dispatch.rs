use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use manbo_voice::bot::{ChatEvent, Dispatcher, ReplyBody, ReplyTarget};
use manbo_voice::config::ManboConfig;
use manbo_voice::ratelimit::{ManualClock, RateLimiter};
use manbo_voice::voice::{Audio, SpeechBackend, VoiceError, VoiceService};

#[derive(Default)]
struct CountingBackend {
    calls: AtomicUsize,
}

#[async_trait]
impl SpeechBackend for CountingBackend {
    async fn synthesize(&self, _text: &str) -> Result<Audio, VoiceError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Audio {
            url: format!("https://cdn.example.com/clip-{}.mp3", n),
        })
    }
}

struct Harness {
    dispatcher: Dispatcher,
    backend: Arc<CountingBackend>,
    clock: Arc<ManualClock>,
}

fn harness(yaml: &str) -> Harness {
    let config = ManboConfig::from_yaml(yaml).unwrap();
    let clock = Arc::new(ManualClock::new(0));
    let backend = Arc::new(CountingBackend::default());
    let limiter = Arc::new(RateLimiter::with_clock(clock.clone()));
    let voice = VoiceService::new(limiter, backend.clone(), config.plugin);

    Harness {
        dispatcher: Dispatcher::new(Arc::new(voice)),
        backend,
        clock,
    }
}

fn event(json: &str) -> ChatEvent {
    serde_json::from_str(json).unwrap()
}

#[tokio::test]
async fn group_command_round_trip() {
    let h = harness("{}");

    let reply = h
        .dispatcher
        .handle(&event(r#"{"message_id": 7, "user_id": 1, "group_id": 99, "text": "/曼波 你好"}"#))
        .await
        .unwrap();

    assert_eq!(
        reply.target,
        ReplyTarget::Group {
            group_id: 99,
            reply_to: 7
        }
    );
    assert_eq!(
        reply.body,
        ReplyBody::Audio {
            url: "https://cdn.example.com/clip-0.mp3".to_string()
        }
    );
}

#[tokio::test]
async fn groups_are_limited_separately_from_private_chats() {
    let h = harness("plugin:\n  rate_limit: 1\n");
    let group = event(r#"{"message_id": 1, "user_id": 1, "group_id": 5, "text": "/曼波 a"}"#);
    let private = event(r#"{"message_id": 2, "user_id": 1, "text": "/曼波 b"}"#);

    assert!(matches!(
        h.dispatcher.handle(&group).await.unwrap().body,
        ReplyBody::Audio { .. }
    ));
    assert!(matches!(
        h.dispatcher.handle(&group).await.unwrap().body,
        ReplyBody::Text { .. }
    ));
    assert!(matches!(
        h.dispatcher.handle(&private).await.unwrap().body,
        ReplyBody::Audio { .. }
    ));
    assert_eq!(h.backend.calls.load(Ordering::SeqCst), 2);
    assert_eq!(h.dispatcher.voice().remaining(Some(5)), 0);
    assert_eq!(h.dispatcher.voice().remaining(None), 0);
}

#[tokio::test]
async fn limit_recovers_after_a_minute() {
    let h = harness("plugin:\n  rate_limit: 1\n");
    let group = event(r#"{"message_id": 1, "user_id": 1, "group_id": 5, "text": "/曼波 a"}"#);

    h.dispatcher.handle(&group).await;
    h.dispatcher.handle(&group).await;
    assert_eq!(h.backend.calls.load(Ordering::SeqCst), 1);

    h.clock.advance(Duration::from_secs(60));
    let reply = h.dispatcher.handle(&group).await.unwrap();
    assert!(matches!(reply.body, ReplyBody::Audio { .. }));
    assert_eq!(h.backend.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn permissions_silence_the_plugin() {
    let h = harness(
        r#"
plugin:
  allowed_groups: [1]
  blocked_users: [666]
  allow_private: false
"#,
    );

    let cases = [
        r#"{"message_id": 1, "user_id": 2, "group_id": 3, "text": "/曼波 hi"}"#,
        r#"{"message_id": 1, "user_id": 666, "group_id": 1, "text": "/曼波 hi"}"#,
        r#"{"message_id": 1, "user_id": 2, "text": "/曼波 hi"}"#,
    ];
    for case in cases {
        assert!(h.dispatcher.handle(&event(case)).await.is_none(), "{}", case);
    }
    assert_eq!(h.backend.calls.load(Ordering::SeqCst), 0);

    let allowed = event(r#"{"message_id": 1, "user_id": 2, "group_id": 1, "text": "/曼波 hi"}"#);
    assert!(h.dispatcher.handle(&allowed).await.is_some());
}

#[tokio::test]
async fn custom_command_word() {
    let h = harness("plugin:\n  command: say\n");

    assert!(h
        .dispatcher
        .handle(&event(r#"{"message_id": 1, "user_id": 1, "text": "/曼波 hi"}"#))
        .await
        .is_none());
    assert!(h
        .dispatcher
        .handle(&event(r#"{"message_id": 1, "user_id": 1, "text": "/say hi"}"#))
        .await
        .is_some());
}
