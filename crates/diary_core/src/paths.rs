//! Tree paths used against the data service.

use crate::domain::{ConversationId, EntryId, Identity};

pub const PAIRS: &str = "pairs";

pub fn user_name(identity: &Identity) -> String {
    format!("users/{}/name", identity)
}

pub fn pair_of(student: &Identity) -> String {
    format!("{}/{}", PAIRS, student)
}

pub fn messages(conversation: &ConversationId) -> String {
    format!("chats/{}/messages", conversation)
}

pub fn message(conversation: &ConversationId, entry: &EntryId) -> String {
    format!("chats/{}/messages/{}", conversation, entry)
}

/// Splits a path into its non-empty segments.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
