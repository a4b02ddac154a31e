use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Attachment, Author, ChannelKind, Snowflake};

/// Channel payload as delivered by the inbound feed. Each variant carries
/// only the fields that kind of channel actually has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundChannel {
    Text {
        id: Snowflake,
        name: String,
        topic: Option<String>,
    },

    Forum {
        id: Snowflake,
        name: String,
        topic: Option<String>,
    },

    /// A post inside a forum channel. `parent` is `None` when the feed could
    /// not resolve it (e.g. parent not in the client cache).
    ForumThread {
        id: Snowflake,
        name: String,
        parent: Option<Box<InboundChannel>>,
    },

    /// Voice, stage, category, DM... Observed but never stored.
    Other { id: Snowflake, name: String },
}

impl InboundChannel {
    pub fn id(&self) -> &Snowflake {
        match self {
            Self::Text { id, .. }
            | Self::Forum { id, .. }
            | Self::ForumThread { id, .. }
            | Self::Other { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. }
            | Self::Forum { name, .. }
            | Self::ForumThread { name, .. }
            | Self::Other { name, .. } => name,
        }
    }

    pub fn kind(&self) -> Option<ChannelKind> {
        match self {
            Self::Text { .. } => Some(ChannelKind::Text),
            Self::Forum { .. } => Some(ChannelKind::Forum),
            Self::ForumThread { .. } => Some(ChannelKind::ForumThread),
            Self::Other { .. } => None,
        }
    }

    /// Parent of a forum thread, if this is one and it was resolved.
    pub fn parent(&self) -> Option<&InboundChannel> {
        match self {
            Self::ForumThread { parent, .. } => parent.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: Snowflake,
    pub author: Author,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub reply_to: Option<Snowflake>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Events accepted by the ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum IngestEvent {
    ChannelCreate { channel: InboundChannel },

    ChannelUpdate { channel: InboundChannel },

    /// A message posted in `channel`, which is usually a forum thread.
    MessageCreate {
        message: InboundMessage,
        channel: InboundChannel,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_with_parent_deserializes() {
        let json = r#"{
            "type": "ChannelCreate",
            "data": {
                "channel": {
                    "kind": "forum_thread",
                    "id": "200",
                    "name": "How do I fetch in a server component?",
                    "parent": { "kind": "forum", "id": "100", "name": "help-forum", "topic": null }
                }
            }
        }"#;

        let event: IngestEvent = serde_json::from_str(json).unwrap();
        let IngestEvent::ChannelCreate { channel } = event else {
            panic!("wrong variant");
        };
        assert_eq!(channel.kind(), Some(ChannelKind::ForumThread));
        let parent = channel.parent().unwrap();
        assert_eq!(parent.id().as_str(), "100");
        assert_eq!(parent.kind(), Some(ChannelKind::Forum));
    }

    #[test]
    fn other_kind_has_no_channel_kind() {
        let json = r#"{ "kind": "other", "id": "7", "name": "Lounge" }"#;
        let channel: InboundChannel = serde_json::from_str(json).unwrap();
        assert_eq!(channel.kind(), None);
        assert!(channel.parent().is_none());
    }
}
