//! Rebuilds the question/answer view of a forum post from its flat,
//! creation-ordered message log.
//!
//! Everything here is pure: no I/O, no shared state, and no input makes it
//! fail. Missing messages (deleted roots, deleted reply targets, deleted
//! answers) come back as explicit states instead of errors.

pub mod answer;
pub mod group;
pub mod reply;
pub mod view;

#[cfg(test)]
mod fixtures;

pub use answer::{find_answer, has_accepted_answer};
pub use group::{MessageGroup, group_by_author};
pub use reply::{ReplyIndex, ReplyState};
pub use view::{ThreadView, assemble_thread};
