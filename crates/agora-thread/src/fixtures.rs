use chrono::{Duration, TimeZone, Utc};

use agora_types::models::{Attachment, Author, ThreadMessage};

pub const POST_ID: &str = "p1";

/// Message in post `p1` by `author`, `minutes` after a fixed epoch.
pub fn msg(id: &str, author: &str, minutes: i64) -> ThreadMessage {
    ThreadMessage {
        id: id.into(),
        post_id: POST_ID.into(),
        author: Author {
            id: author.into(),
            username: author.to_lowercase(),
            avatar_url: None,
        },
        created_at: Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes),
        content: format!("{id} says hi"),
        reply_to: None,
        attachments: Vec::new(),
    }
}

pub fn reply(id: &str, author: &str, minutes: i64, to: &str) -> ThreadMessage {
    ThreadMessage {
        reply_to: Some(to.into()),
        ..msg(id, author, minutes)
    }
}

pub fn with_attachment(mut message: ThreadMessage, name: &str) -> ThreadMessage {
    message.attachments.push(Attachment {
        id: format!("att-{name}").into(),
        url: format!("https://cdn.example/{name}"),
        name: name.into(),
        content_type: None,
    });
    message
}
