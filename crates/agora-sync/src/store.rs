use std::sync::Arc;

use anyhow::Result;

use agora_db::Database;
use agora_db::models::{AttachmentRow, ChannelRow, MessageRow, PostRow, UserRow};

/// Write side of the mirror. Every method must be an atomic per-key
/// insert-or-update so that concurrent or repeated calls collapse into one row.
pub trait ForumStore: Send + Sync {
    /// Insert, or on conflict update name and topic only.
    fn upsert_channel(&self, channel: &ChannelRow) -> Result<()>;

    fn upsert_user(&self, user: &UserRow) -> Result<()>;

    /// Authoritative post header, written from the root message.
    fn upsert_post(&self, post: &PostRow) -> Result<()>;

    /// Placeholder post header; no-op if the post exists.
    fn ensure_post(&self, post: &PostRow) -> Result<()>;

    /// Insert-once message plus its attachments.
    fn insert_message(&self, message: &MessageRow, attachments: &[AttachmentRow]) -> Result<()>;
}

impl ForumStore for Database {
    fn upsert_channel(&self, channel: &ChannelRow) -> Result<()> {
        Database::upsert_channel(self, channel)
    }

    fn upsert_user(&self, user: &UserRow) -> Result<()> {
        Database::upsert_user(self, user)
    }

    fn upsert_post(&self, post: &PostRow) -> Result<()> {
        Database::upsert_post(self, post)
    }

    fn ensure_post(&self, post: &PostRow) -> Result<()> {
        Database::ensure_post(self, post)
    }

    fn insert_message(&self, message: &MessageRow, attachments: &[AttachmentRow]) -> Result<()> {
        Database::insert_message(self, message, attachments)
    }
}

impl<T: ForumStore + ?Sized> ForumStore for Arc<T> {
    fn upsert_channel(&self, channel: &ChannelRow) -> Result<()> {
        (**self).upsert_channel(channel)
    }

    fn upsert_user(&self, user: &UserRow) -> Result<()> {
        (**self).upsert_user(user)
    }

    fn upsert_post(&self, post: &PostRow) -> Result<()> {
        (**self).upsert_post(post)
    }

    fn ensure_post(&self, post: &PostRow) -> Result<()> {
        (**self).ensure_post(post)
    }

    fn insert_message(&self, message: &MessageRow, attachments: &[AttachmentRow]) -> Result<()> {
        (**self).insert_message(message, attachments)
    }
}
