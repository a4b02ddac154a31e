use serde::Serialize;

use agora_types::models::{Attachment, Author, Post, Snowflake, ThreadMessage};

use crate::answer::find_answer;
use crate::group::group_by_author;
use crate::reply::{ReplyIndex, ReplyState};

/// Display-ready post, handed to the rendering layer as-is.
#[derive(Debug, Serialize)]
pub struct ThreadView<'a> {
    pub post: &'a Post,
    /// `None` renders as "original message was deleted".
    pub root: Option<&'a ThreadMessage>,
    pub has_answer: bool,
    pub answer: Option<AnswerPreview<'a>>,
    pub reply_count: usize,
    pub groups: Vec<GroupView<'a>>,
}

#[derive(Debug, Serialize)]
pub struct AnswerPreview<'a> {
    pub message_id: &'a Snowflake,
    pub author: &'a Author,
    pub content: &'a str,
    pub attachments: &'a [Attachment],
}

#[derive(Debug, Serialize)]
pub struct GroupView<'a> {
    pub author_id: &'a Snowflake,
    pub is_answer_group: bool,
    pub messages: Vec<MessageView<'a>>,
}

#[derive(Debug, Serialize)]
pub struct MessageView<'a> {
    #[serde(flatten)]
    pub message: &'a ThreadMessage,
    pub reply: ReplyState<'a>,
    /// Show the author header: first in its group, or quoting another message.
    pub is_first_row: bool,
    /// Written by the post's original author.
    pub is_op: bool,
}

/// Build the full view of one post from its separately loaded root message
/// and its creation-ordered replies.
pub fn assemble_thread<'a>(
    post: &'a Post,
    root: Option<&'a ThreadMessage>,
    replies: &'a [ThreadMessage],
) -> ThreadView<'a> {
    let answer_id = post.answer_id.as_ref();
    let index = ReplyIndex::new(replies, root);
    let op = root.map(|r| &r.author.id);

    let groups = group_by_author(replies, answer_id)
        .into_iter()
        .map(|group| GroupView {
            author_id: group.author_id,
            is_answer_group: group.is_answer_group,
            messages: group
                .messages
                .into_iter()
                .enumerate()
                .map(|(i, message)| MessageView {
                    message,
                    reply: index.resolve(message),
                    is_first_row: i == 0 || message.reply_to.is_some(),
                    is_op: op == Some(&message.author.id),
                })
                .collect(),
        })
        .collect();

    let answer = find_answer(answer_id, replies).map(|m| AnswerPreview {
        message_id: &m.id,
        author: &m.author,
        content: &m.content,
        attachments: &m.attachments,
    });

    ThreadView {
        post,
        root,
        has_answer: answer.is_some(),
        answer,
        reply_count: replies.len(),
        groups,
    }
}
