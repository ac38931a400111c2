//! Incoming chat events and outgoing replies.

use serde::{Deserialize, Serialize};

/// A chat message delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    pub message_id: i64,
    pub user_id: i64,
    /// Set for group messages, absent for private chats
    #[serde(default)]
    pub group_id: Option<i64>,
    pub text: String,
}

impl ChatEvent {
    pub fn is_group(&self) -> bool {
        self.group_id.is_some()
    }

    /// Where a reply to this event should go.
    pub fn reply_target(&self) -> ReplyTarget {
        match self.group_id {
            Some(group_id) => ReplyTarget::Group {
                group_id,
                reply_to: self.message_id,
            },
            None => ReplyTarget::Private {
                user_id: self.user_id,
                reply_to: self.message_id,
            },
        }
    }
}

/// Destination of a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReplyTarget {
    Group { group_id: i64, reply_to: i64 },
    Private { user_id: i64, reply_to: i64 },
}

/// Content of a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReplyBody {
    Text { text: String },
    Audio { url: String },
}

/// A message the host should send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub target: ReplyTarget,
    pub body: ReplyBody,
}

impl Reply {
    pub fn text(event: &ChatEvent, text: impl Into<String>) -> Self {
        Self {
            target: event.reply_target(),
            body: ReplyBody::Text { text: text.into() },
        }
    }

    pub fn audio(event: &ChatEvent, url: impl Into<String>) -> Self {
        Self {
            target: event.reply_target(),
            body: ReplyBody::Audio { url: url.into() },
        }
    }
}
