use std::sync::Arc;

use tracing::debug;

use agora_db::models::{AttachmentRow, MessageRow, PostRow, UserRow};
use agora_db::queries::format_timestamp;
use agora_types::events::{InboundChannel, InboundMessage, IngestEvent};

use crate::cache::ChannelCache;
use crate::channels::{ChannelSync, SyncOutcome, qualifying_parent};
use crate::error::SyncError;
use crate::store::ForumStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Channel(SyncOutcome),
    MessageStored,
    /// Message outside a forum thread with a text/forum parent.
    Ignored,
}

/// Applies inbound feed events to the store.
pub struct Ingestor<S> {
    channels: ChannelSync<S>,
}

impl<S: ForumStore> Ingestor<S> {
    pub fn new(store: S, cache: Arc<ChannelCache>) -> Self {
        Self {
            channels: ChannelSync::new(store, cache),
        }
    }

    pub fn channels(&self) -> &ChannelSync<S> {
        &self.channels
    }

    pub fn apply(&self, event: &IngestEvent) -> Result<IngestOutcome, SyncError> {
        match event {
            IngestEvent::ChannelCreate { channel } => {
                self.channels.sync_channel(channel).map(IngestOutcome::Channel)
            }
            IngestEvent::ChannelUpdate { channel } => {
                self.channels.refresh_channel(channel).map(IngestOutcome::Channel)
            }
            IngestEvent::MessageCreate { message, channel } => self.store_message(message, channel),
        }
    }

    fn store_message(
        &self,
        message: &InboundMessage,
        context: &InboundChannel,
    ) -> Result<IngestOutcome, SyncError> {
        let Some(parent) = qualifying_parent(context) else {
            debug!("Ignoring message {} outside a forum thread", message.id);
            return Ok(IngestOutcome::Ignored);
        };

        self.channels.sync_from_message_context(context)?;

        let store = self.channels.store();
        let fail = |e: anyhow::Error| SyncError::message(&message.id, e);

        store
            .upsert_user(&UserRow {
                id: message.author.id.to_string(),
                username: message.author.username.clone(),
                avatar_url: message.author.avatar_url.clone(),
            })
            .map_err(fail)?;

        let created_at = format_timestamp(&message.created_at);
        let post = PostRow {
            id: context.id().to_string(),
            title: context.name().to_string(),
            channel_id: parent.id().to_string(),
            author_id: message.author.id.to_string(),
            created_at: created_at.clone(),
        };
        // Only the root message knows the real post author
        let is_root = &message.id == context.id();
        if is_root {
            store.upsert_post(&post).map_err(fail)?;
        } else {
            store.ensure_post(&post).map_err(fail)?;
        }

        let row = MessageRow {
            id: message.id.to_string(),
            post_id: context.id().to_string(),
            author_id: message.author.id.to_string(),
            content: message.content.clone(),
            reply_to: message.reply_to.as_ref().map(|id| id.to_string()),
            created_at,
        };
        let attachments: Vec<AttachmentRow> = message
            .attachments
            .iter()
            .map(|a| AttachmentRow {
                id: a.id.to_string(),
                message_id: row.id.clone(),
                url: a.url.clone(),
                name: a.name.clone(),
                content_type: a.content_type.clone(),
            })
            .collect();
        store.insert_message(&row, &attachments).map_err(fail)?;

        debug!(
            "Stored message {} in post {} ({} attachments)",
            row.id,
            row.post_id,
            attachments.len()
        );
        Ok(IngestOutcome::MessageStored)
    }
}
