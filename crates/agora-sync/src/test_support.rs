use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{Result, anyhow};

use agora_db::models::{AttachmentRow, ChannelRow, MessageRow, PostRow, UserRow};
use agora_types::events::InboundChannel;

use crate::store::ForumStore;

/// In-memory store that counts calls and successful writes.
#[derive(Default)]
pub struct CountingStore {
    calls: AtomicUsize,
    writes: AtomicUsize,
    fail: AtomicBool,
    channels: Mutex<HashMap<String, ChannelRow>>,
    users: Mutex<HashMap<String, UserRow>>,
    posts: Mutex<HashMap<String, PostRow>>,
    messages: Mutex<HashMap<String, (MessageRow, Vec<AttachmentRow>)>>,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn channel(&self, id: &str) -> Option<ChannelRow> {
        self.channels.lock().unwrap().get(id).cloned()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.lock().unwrap().len()
    }

    pub fn user(&self, id: &str) -> Option<UserRow> {
        self.users.lock().unwrap().get(id).cloned()
    }

    pub fn post(&self, id: &str) -> Option<PostRow> {
        self.posts.lock().unwrap().get(id).cloned()
    }

    pub fn message(&self, id: &str) -> Option<(MessageRow, Vec<AttachmentRow>)> {
        self.messages.lock().unwrap().get(id).cloned()
    }

    fn begin(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("connection refused"));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl ForumStore for CountingStore {
    fn upsert_channel(&self, channel: &ChannelRow) -> Result<()> {
        self.begin()?;
        let mut channels = self.channels.lock().unwrap();
        match channels.get_mut(&channel.id) {
            Some(existing) => {
                existing.name = channel.name.clone();
                existing.topic = channel.topic.clone();
            }
            None => {
                channels.insert(channel.id.clone(), channel.clone());
            }
        }
        Ok(())
    }

    fn upsert_user(&self, user: &UserRow) -> Result<()> {
        self.begin()?;
        self.users.lock().unwrap().insert(user.id.clone(), user.clone());
        Ok(())
    }

    fn upsert_post(&self, post: &PostRow) -> Result<()> {
        self.begin()?;
        self.posts.lock().unwrap().insert(post.id.clone(), post.clone());
        Ok(())
    }

    fn ensure_post(&self, post: &PostRow) -> Result<()> {
        self.begin()?;
        self.posts
            .lock()
            .unwrap()
            .entry(post.id.clone())
            .or_insert_with(|| post.clone());
        Ok(())
    }

    fn insert_message(&self, message: &MessageRow, attachments: &[AttachmentRow]) -> Result<()> {
        self.begin()?;
        self.messages
            .lock()
            .unwrap()
            .entry(message.id.clone())
            .or_insert_with(|| (message.clone(), attachments.to_vec()));
        Ok(())
    }
}

pub fn forum(id: &str, name: &str) -> InboundChannel {
    InboundChannel::Forum {
        id: id.into(),
        name: name.into(),
        topic: Some("Ask for help here".into()),
    }
}

pub fn text(id: &str, name: &str, topic: Option<&str>) -> InboundChannel {
    InboundChannel::Text {
        id: id.into(),
        name: name.into(),
        topic: topic.map(String::from),
    }
}

pub fn thread(id: &str, name: &str, parent: Option<InboundChannel>) -> InboundChannel {
    InboundChannel::ForumThread {
        id: id.into(),
        name: name.into(),
        parent: parent.map(Box::new),
    }
}
