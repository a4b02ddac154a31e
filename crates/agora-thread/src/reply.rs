use std::collections::HashMap;

use serde::Serialize;

use agora_types::models::{Attachment, Author, Snowflake, ThreadMessage};

/// What a message's reply reference resolves to.
///
/// `Dangling` and `NoReply` must stay distinct: one renders as "replying to
/// a deleted message", the other renders nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReplyState<'a> {
    NoReply,
    Resolved {
        target_id: &'a Snowflake,
        author: &'a Author,
        content: &'a str,
        attachments: &'a [Attachment],
    },
    Dangling {
        target_id: &'a Snowflake,
    },
}

/// Lookup over every message a reply may point at: the in-window replies
/// plus the root message, which is loaded separately.
pub struct ReplyIndex<'a> {
    by_id: HashMap<&'a Snowflake, &'a ThreadMessage>,
}

impl<'a> ReplyIndex<'a> {
    pub fn new(replies: &'a [ThreadMessage], root: Option<&'a ThreadMessage>) -> Self {
        let by_id = replies
            .iter()
            .chain(root)
            .map(|m| (&m.id, m))
            .collect();
        Self { by_id }
    }

    pub fn get(&self, id: &Snowflake) -> Option<&'a ThreadMessage> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn resolve(&self, message: &'a ThreadMessage) -> ReplyState<'a> {
        let Some(target_id) = message.reply_to.as_ref() else {
            return ReplyState::NoReply;
        };

        match self.get(target_id) {
            Some(target) => ReplyState::Resolved {
                target_id: &target.id,
                author: &target.author,
                content: &target.content,
                attachments: &target.attachments,
            },
            None => ReplyState::Dangling { target_id },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{POST_ID, msg, reply, with_attachment};

    #[test]
    fn null_reference_is_no_reply() {
        let replies = vec![msg("m1", "A", 1)];
        let index = ReplyIndex::new(&replies, None);
        assert_eq!(index.resolve(&replies[0]), ReplyState::NoReply);
    }

    #[test]
    fn missing_target_is_dangling() {
        let replies = vec![reply("m2", "B", 2, "gone")];
        let index = ReplyIndex::new(&replies, None);

        match index.resolve(&replies[0]) {
            ReplyState::Dangling { target_id } => assert_eq!(target_id.as_str(), "gone"),
            other => panic!("expected dangling, got {other:?}"),
        }
    }

    #[test]
    fn present_target_resolves_with_author_and_content() {
        let replies = vec![
            with_attachment(msg("m1", "A", 1), "screenshot.png"),
            reply("m2", "B", 2, "m1"),
        ];
        let index = ReplyIndex::new(&replies, None);

        let ReplyState::Resolved {
            target_id,
            author,
            content,
            attachments,
        } = index.resolve(&replies[1])
        else {
            panic!("expected resolved reply");
        };
        assert_eq!(target_id.as_str(), "m1");
        assert_eq!(author.id.as_str(), "A");
        assert_eq!(content, "m1 says hi");
        assert_eq!(attachments.len(), 1);
    }

    #[test]
    fn root_message_is_a_candidate() {
        let root = msg(POST_ID, "A", 0);
        let replies = vec![reply("m1", "B", 1, POST_ID)];
        let index = ReplyIndex::new(&replies, Some(&root));

        assert_eq!(index.len(), 2);
        assert!(matches!(
            index.resolve(&replies[0]),
            ReplyState::Resolved { author, .. } if author.id.as_str() == "A"
        ));

        // Same reply, root deleted
        let without_root = ReplyIndex::new(&replies, None);
        assert!(matches!(without_root.resolve(&replies[0]), ReplyState::Dangling { .. }));
    }

    #[test]
    fn serializes_with_state_tag() {
        let replies = vec![reply("m2", "B", 2, "gone")];
        let index = ReplyIndex::new(&replies, None);

        let json = serde_json::to_value(index.resolve(&replies[0])).unwrap();
        assert_eq!(json["state"], "dangling");
        assert_eq!(json["target_id"], "gone");
    }
}
