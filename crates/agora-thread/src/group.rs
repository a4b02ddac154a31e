use serde::Serialize;

use agora_types::models::{Snowflake, ThreadMessage};

/// A run of consecutive messages from one author.
#[derive(Debug, Clone, Serialize)]
pub struct MessageGroup<'a> {
    pub author_id: &'a Snowflake,
    /// True if any member is the post's accepted answer.
    pub is_answer_group: bool,
    pub messages: Vec<&'a ThreadMessage>,
}

/// Batch consecutive same-author messages, preserving order.
///
/// Runs break on author change only. Two messages from the same author a
/// week apart still land in one group.
pub fn group_by_author<'a>(
    messages: &'a [ThreadMessage],
    answer_id: Option<&Snowflake>,
) -> Vec<MessageGroup<'a>> {
    let mut groups: Vec<MessageGroup<'a>> = Vec::new();

    for message in messages {
        let starts_group = groups
            .last()
            .map_or(true, |g| *g.author_id != message.author.id);

        if starts_group {
            groups.push(MessageGroup {
                author_id: &message.author.id,
                is_answer_group: false,
                messages: Vec::new(),
            });
        }

        if let Some(group) = groups.last_mut() {
            group.is_answer_group |= answer_id == Some(&message.id);
            group.messages.push(message);
        }
    }

    groups
}
