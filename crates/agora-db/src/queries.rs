use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::warn;

use agora_types::models::{Attachment, Author, Post, Snowflake, ThreadMessage};

use crate::Database;
use crate::models::{
    AttachmentRow, ChannelRow, MessageDetailRow, MessageRow, PostDetailRow, PostRow, UserRow,
};

/// Everything the thread assembler needs for one post.
#[derive(Debug, Clone)]
pub struct LoadedThread {
    pub post: Post,
    /// `None` when the root message was deleted upstream.
    pub root: Option<ThreadMessage>,
    /// Replies in creation order, root excluded.
    pub replies: Vec<ThreadMessage>,
}

impl Database {
    // -- Channels --

    /// Insert a channel, or refresh its name/topic if the id already exists.
    /// `kind` is immutable after the first write.
    pub fn upsert_channel(&self, channel: &ChannelRow) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO channels (id, name, kind, topic) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET name = excluded.name, topic = excluded.topic",
                params![channel.id, channel.name, channel.kind, channel.topic],
            )?;
            Ok(())
        })
    }

    pub fn get_channel(&self, id: &str) -> Result<Option<ChannelRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, name, kind, topic FROM channels WHERE id = ?1",
                    [id],
                    |row| {
                        Ok(ChannelRow {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            kind: row.get(2)?,
                            topic: row.get(3)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn count_channels(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM channels", [], |r| r.get(0))?;
            Ok(count as u64)
        })
    }

    // -- Users --

    pub fn upsert_user(&self, user: &UserRow) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, avatar_url) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET username = excluded.username, avatar_url = excluded.avatar_url",
                params![user.id, user.username, user.avatar_url],
            )?;
            Ok(())
        })
    }

    // -- Posts --

    /// Write the post header from its root message. Never touches `answer_id`.
    pub fn upsert_post(&self, post: &PostRow) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO posts (id, title, channel_id, author_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    author_id = excluded.author_id,
                    created_at = excluded.created_at",
                params![post.id, post.title, post.channel_id, post.author_id, post.created_at],
            )?;
            Ok(())
        })
    }

    /// Create a placeholder post for a reply that arrived before its root.
    /// An existing row is left alone.
    pub fn ensure_post(&self, post: &PostRow) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO posts (id, title, channel_id, author_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO NOTHING",
                params![post.id, post.title, post.channel_id, post.author_id, post.created_at],
            )?;
            Ok(())
        })
    }

    /// Set or clear the accepted answer. Returns false if the post is unknown.
    pub fn set_post_answer(&self, post_id: &str, answer_id: Option<&str>) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE posts SET answer_id = ?2 WHERE id = ?1",
                params![post_id, answer_id],
            )?;
            Ok(changed > 0)
        })
    }

    // -- Messages --

    /// Store a message and its attachments in one transaction. Messages are
    /// immutable: a second insert of the same id is a no-op.
    pub fn insert_message(&self, message: &MessageRow, attachments: &[AttachmentRow]) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO messages (id, post_id, author_id, content, reply_to, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO NOTHING",
                params![
                    message.id,
                    message.post_id,
                    message.author_id,
                    message.content,
                    message.reply_to,
                    message.created_at
                ],
            )?;

            for a in attachments {
                tx.execute(
                    "INSERT INTO attachments (id, message_id, url, name, content_type)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(id) DO NOTHING",
                    params![a.id, a.message_id, a.url, a.name, a.content_type],
                )?;
            }

            tx.commit()?;
            Ok(())
        })
    }

    pub fn count_messages(&self, post_id: &str) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE post_id = ?1",
                [post_id],
                |r| r.get(0),
            )?;
            Ok(count as u64)
        })
    }

    // -- Threads --

    /// Load a post with its root message and replies, attachments joined.
    /// Returns `None` if the post is unknown.
    pub fn load_thread(&self, post_id: &str) -> Result<Option<LoadedThread>> {
        self.with_conn(|conn| {
            let Some(post) = query_post(conn, post_id)? else {
                return Ok(None);
            };

            let root = query_root_message(conn, post_id)?;
            let replies = query_replies(conn, post_id)?;

            let message_ids: Vec<String> = root
                .iter()
                .chain(replies.iter())
                .map(|m| m.id.clone())
                .collect();
            let mut attachments = group_attachments(query_attachments(conn, &message_ids)?);

            let mut to_message = |row: MessageDetailRow| {
                let files = attachments.remove(&row.id).unwrap_or_default();
                thread_message(row, files)
            };

            Ok(Some(LoadedThread {
                post: post_from_row(post),
                root: root.map(&mut to_message),
                replies: replies.into_iter().map(&mut to_message).collect(),
            }))
        })
    }
}

fn query_post(conn: &Connection, post_id: &str) -> Result<Option<PostDetailRow>> {
    // Authors and channels are always written before the post, so inner joins are safe.
    let row = conn
        .query_row(
            "SELECT p.id, p.title, p.channel_id, c.name, p.author_id, u.username, p.created_at, p.answer_id
             FROM posts p
             JOIN users u ON u.id = p.author_id
             JOIN channels c ON c.id = p.channel_id
             WHERE p.id = ?1",
            [post_id],
            |row| {
                Ok(PostDetailRow {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    channel_id: row.get(2)?,
                    channel_name: row.get(3)?,
                    author_id: row.get(4)?,
                    author_username: row.get(5)?,
                    created_at: row.get(6)?,
                    answer_id: row.get(7)?,
                })
            },
        )
        .optional()?;

    Ok(row)
}

const MESSAGE_COLUMNS: &str = "m.id, m.post_id, m.author_id, u.username, u.avatar_url, m.content, m.reply_to, m.created_at";

fn map_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageDetailRow> {
    Ok(MessageDetailRow {
        id: row.get(0)?,
        post_id: row.get(1)?,
        author_id: row.get(2)?,
        author_username: row.get(3)?,
        author_avatar_url: row.get(4)?,
        content: row.get(5)?,
        reply_to: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn query_root_message(conn: &Connection, post_id: &str) -> Result<Option<MessageDetailRow>> {
    let sql = format!(
        "SELECT {MESSAGE_COLUMNS}
         FROM messages m
         JOIN users u ON u.id = m.author_id
         WHERE m.post_id = ?1 AND m.id = ?1"
    );
    let row = conn.query_row(&sql, [post_id], map_message).optional()?;
    Ok(row)
}

fn query_replies(conn: &Connection, post_id: &str) -> Result<Vec<MessageDetailRow>> {
    let sql = format!(
        "SELECT {MESSAGE_COLUMNS}
         FROM messages m
         JOIN users u ON u.id = m.author_id
         WHERE m.post_id = ?1 AND m.id != ?1
         ORDER BY m.created_at ASC, m.id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([post_id], map_message)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Batch-fetch attachments for a set of message IDs.
fn query_attachments(conn: &Connection, message_ids: &[String]) -> Result<Vec<AttachmentRow>> {
    if message_ids.is_empty() {
        return Ok(vec![]);
    }

    let placeholders: Vec<String> = (1..=message_ids.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "SELECT id, message_id, url, name, content_type FROM attachments
         WHERE message_id IN ({}) ORDER BY id",
        placeholders.join(", ")
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(message_ids.iter()), |row| {
            Ok(AttachmentRow {
                id: row.get(0)?,
                message_id: row.get(1)?,
                url: row.get(2)?,
                name: row.get(3)?,
                content_type: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn group_attachments(rows: Vec<AttachmentRow>) -> HashMap<String, Vec<Attachment>> {
    let mut map: HashMap<String, Vec<Attachment>> = HashMap::new();
    for row in rows {
        map.entry(row.message_id).or_default().push(Attachment {
            id: Snowflake::new(row.id),
            url: row.url,
            name: row.name,
            content_type: row.content_type,
        });
    }
    map
}

fn post_from_row(row: PostDetailRow) -> Post {
    let created_at = parse_timestamp(&row.created_at, &row.id);
    Post {
        id: row.id.into(),
        title: row.title,
        channel_id: row.channel_id.into(),
        channel_name: row.channel_name,
        author_id: row.author_id.into(),
        author_username: row.author_username,
        created_at,
        answer_id: row.answer_id.map(Snowflake::new),
    }
}

fn thread_message(row: MessageDetailRow, attachments: Vec<Attachment>) -> ThreadMessage {
    let created_at = parse_timestamp(&row.created_at, &row.id);
    ThreadMessage {
        id: row.id.into(),
        post_id: row.post_id.into(),
        author: Author {
            id: row.author_id.into(),
            username: row.author_username,
            avatar_url: row.author_avatar_url,
        },
        created_at,
        content: row.content,
        reply_to: row.reply_to.map(Snowflake::new),
        attachments,
    }
}

/// Timestamps are written as fixed-width RFC 3339 so text order is time order.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(raw: &str, id: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // Rows written by SQLite's datetime('now') have no timezone.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on '{}': {}", raw, id, e);
            DateTime::default()
        })
}
