use agora_types::models::{Snowflake, ThreadMessage};

/// The accepted answer, if it is set and still present in `messages`.
pub fn find_answer<'a>(
    answer_id: Option<&Snowflake>,
    messages: &'a [ThreadMessage],
) -> Option<&'a ThreadMessage> {
    let answer_id = answer_id?;
    messages.iter().find(|m| &m.id == answer_id)
}

/// An answer id pointing at a deleted message does not count.
pub fn has_accepted_answer(answer_id: Option<&Snowflake>, messages: &[ThreadMessage]) -> bool {
    find_answer(answer_id, messages).is_some()
}
