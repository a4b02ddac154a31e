use std::sync::Arc;

use tracing::{debug, info};

use agora_db::models::ChannelRow;
use agora_types::events::InboundChannel;
use agora_types::models::ChannelKind;

use crate::cache::ChannelCache;
use crate::error::SyncError;
use crate::store::ForumStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Row written (inserted or name/topic refreshed).
    Synced,
    /// Already written earlier in this process; no store access.
    Cached,
    /// Not a text or forum channel, or no qualifying parent.
    Skipped,
}

/// Keeps the `channels` table in step with the feed.
///
/// Safe to call concurrently. Two callers racing on a never-seen id may both
/// miss the cache and both write; the store upsert folds them into one row.
pub struct ChannelSync<S> {
    store: S,
    cache: Arc<ChannelCache>,
}

impl<S: ForumStore> ChannelSync<S> {
    pub fn new(store: S, cache: Arc<ChannelCache>) -> Self {
        Self { store, cache }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &ChannelCache {
        &self.cache
    }

    /// Upsert a text or forum channel. Other kinds are skipped without
    /// touching the store or the cache.
    pub fn sync_channel(&self, channel: &InboundChannel) -> Result<SyncOutcome, SyncError> {
        let Some(row) = channel_row(channel) else {
            debug!("Skipping channel {} ({:?})", channel.id(), channel.kind());
            return Ok(SyncOutcome::Skipped);
        };

        if self.cache.has(channel.id()) {
            return Ok(SyncOutcome::Cached);
        }

        self.write(channel, row)
    }

    /// Like `sync_channel` but ignores the cache, for explicit update events
    /// that carry a new name or topic.
    pub fn refresh_channel(&self, channel: &InboundChannel) -> Result<SyncOutcome, SyncError> {
        match channel_row(channel) {
            Some(row) => self.write(channel, row),
            None => Ok(SyncOutcome::Skipped),
        }
    }

    fn write(&self, channel: &InboundChannel, row: ChannelRow) -> Result<SyncOutcome, SyncError> {
        let id = channel.id();
        self.store
            .upsert_channel(&row)
            .map_err(|e| SyncError::channel(id, e))?;

        info!("Synced channel (#{})", row.name);
        self.cache.mark(id.clone());
        Ok(SyncOutcome::Synced)
    }

    /// Sync the parent of a forum thread a message was posted in.
    pub fn sync_from_message_context(&self, context: &InboundChannel) -> Result<SyncOutcome, SyncError> {
        match qualifying_parent(context) {
            Some(parent) => self.sync_channel(parent),
            None => Ok(SyncOutcome::Skipped),
        }
    }
}

/// Parent channel of a forum thread, if it is a text or forum channel.
pub(crate) fn qualifying_parent(context: &InboundChannel) -> Option<&InboundChannel> {
    let InboundChannel::ForumThread { parent: Some(parent), .. } = context else {
        return None;
    };

    match **parent {
        InboundChannel::Text { .. } | InboundChannel::Forum { .. } => Some(&**parent),
        _ => None,
    }
}

fn channel_row(channel: &InboundChannel) -> Option<ChannelRow> {
    let (id, name, topic, kind) = match channel {
        InboundChannel::Text { id, name, topic } => (id, name, topic, ChannelKind::Text),
        InboundChannel::Forum { id, name, topic } => (id, name, topic, ChannelKind::Forum),
        InboundChannel::ForumThread { .. } | InboundChannel::Other { .. } => return None,
    };

    Some(ChannelRow {
        id: id.to_string(),
        name: name.clone(),
        kind: kind.as_str().to_string(),
        topic: topic.clone().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CountingStore, forum, text, thread};
    use agora_types::Snowflake;

    fn syncer() -> ChannelSync<Arc<CountingStore>> {
        ChannelSync::new(Arc::new(CountingStore::default()), Arc::new(ChannelCache::new()))
    }

    #[test]
    fn sync_twice_writes_once() {
        let sync = syncer();
        let channel = forum("100", "help-forum");

        assert_eq!(sync.sync_channel(&channel).unwrap(), SyncOutcome::Synced);
        assert_eq!(sync.sync_channel(&channel).unwrap(), SyncOutcome::Cached);

        assert_eq!(sync.store().writes(), 1);
        assert_eq!(sync.store().channel_count(), 1);
        assert!(sync.cache().has(&Snowflake::from("100")));
    }

    #[test]
    fn topic_defaults_to_empty() {
        let sync = syncer();
        sync.sync_channel(&text("5", "general", None)).unwrap();

        let row = sync.store().channel("5").unwrap();
        assert_eq!(row.topic, "");
        assert_eq!(row.kind, "text");
    }

    #[test]
    fn unsupported_kinds_are_skipped() {
        let sync = syncer();
        let voice = InboundChannel::Other {
            id: "9".into(),
            name: "Voice".into(),
        };
        let bare_thread = thread("200", "question", None);

        assert_eq!(sync.sync_channel(&voice).unwrap(), SyncOutcome::Skipped);
        assert_eq!(sync.sync_channel(&bare_thread).unwrap(), SyncOutcome::Skipped);

        assert_eq!(sync.store().calls(), 0);
        assert!(sync.cache().is_empty());
    }

    #[test]
    fn store_failure_leaves_cache_unmarked() {
        let sync = syncer();
        let channel = forum("100", "help-forum");

        sync.store().fail_writes(true);
        let err = sync.sync_channel(&channel).unwrap_err();
        assert!(matches!(err, SyncError::Channel { ref id, .. } if id.as_str() == "100"));
        assert!(sync.cache().is_empty());

        // Caller-driven retry goes back to the store
        sync.store().fail_writes(false);
        assert_eq!(sync.sync_channel(&channel).unwrap(), SyncOutcome::Synced);
        assert_eq!(sync.store().writes(), 1);
    }

    #[test]
    fn message_context_syncs_forum_parent() {
        let sync = syncer();
        let context = thread("200", "question", Some(forum("100", "help-forum")));

        assert_eq!(sync.sync_from_message_context(&context).unwrap(), SyncOutcome::Synced);
        assert!(sync.store().channel("100").is_some());
        // The thread itself is never stored as a channel
        assert!(sync.store().channel("200").is_none());
    }

    #[test]
    fn message_context_without_qualifying_parent_is_noop() {
        let sync = syncer();
        let voice_parent = InboundChannel::Other {
            id: "9".into(),
            name: "Voice".into(),
        };

        let contexts = [
            text("5", "general", None),
            thread("200", "orphan", None),
            thread("201", "odd", Some(voice_parent)),
        ];
        for context in &contexts {
            assert_eq!(sync.sync_from_message_context(context).unwrap(), SyncOutcome::Skipped);
        }
        assert_eq!(sync.store().calls(), 0);
    }
}
