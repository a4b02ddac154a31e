use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upstream entity identifier. Snowflakes are kept as opaque strings and
/// never parsed or compared numerically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snowflake(String);

impl Snowflake {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Snowflake {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Snowflake {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Channel kinds that are persisted. Anything else on the feed (voice,
/// categories, DMs) never reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Text,
    Forum,
    ForumThread,
}

impl ChannelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Forum => "forum",
            Self::ForumThread => "forum_thread",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Snowflake,
    pub username: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Snowflake,
    pub url: String,
    pub name: String,
    pub content_type: Option<String>,
}

/// A message as loaded for one thread, author and attachments already joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: Snowflake,
    pub post_id: Snowflake,
    pub author: Author,
    pub created_at: DateTime<Utc>,
    pub content: String,
    pub reply_to: Option<Snowflake>,
    pub attachments: Vec<Attachment>,
}

impl ThreadMessage {
    /// The root message shares its identifier with the thread.
    pub fn is_root(&self) -> bool {
        self.id == self.post_id
    }
}

/// A forum post (thread) header. `answer_id` is set by moderation and may
/// point at a message that no longer exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Snowflake,
    pub title: String,
    pub channel_id: Snowflake,
    pub channel_name: String,
    pub author_id: Snowflake,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
    pub answer_id: Option<Snowflake>,
}
