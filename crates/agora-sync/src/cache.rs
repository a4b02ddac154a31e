use dashmap::DashSet;

use agora_types::Snowflake;

/// Presence set of channel ids already written this process.
///
/// Entries are never evicted: the channel population is small and bounded.
/// This only saves writes; the store's upsert is what keeps concurrent
/// duplicate syncs correct.
#[derive(Debug, Default)]
pub struct ChannelCache {
    seen: DashSet<Snowflake>,
}

impl ChannelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, id: &Snowflake) -> bool {
        self.seen.contains(id)
    }

    pub fn mark(&self, id: Snowflake) {
        self.seen.insert(id);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
