//! Database row types — these map directly to SQLite rows.
//! Distinct from agora-types models to keep the DB layer independent.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRow {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRow {
    pub id: String,
    pub title: String,
    pub channel_id: String,
    pub author_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub content: String,
    pub reply_to: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRow {
    pub id: String,
    pub message_id: String,
    pub url: String,
    pub name: String,
    pub content_type: Option<String>,
}

/// Post joined with its author and channel.
pub struct PostDetailRow {
    pub id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_name: String,
    pub author_id: String,
    pub author_username: String,
    pub created_at: String,
    pub answer_id: Option<String>,
}

/// Message joined with its author.
pub struct MessageDetailRow {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub author_username: String,
    pub author_avatar_url: Option<String>,
    pub content: String,
    pub reply_to: Option<String>,
    pub created_at: String,
}
