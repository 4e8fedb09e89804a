//! Conversation addressing.
//!
//! Both participants compute the conversation key on their own and must land on
//! the same storage location, so this is a pure function of the two identities.

use crate::domain::{ConversationId, Identity};

/// Joins the student and teacher identities inside a conversation key.
pub const SEPARATOR: char = '_';

/// Characters the data service does not accept inside a path key.
const PATH_METACHARACTERS: [char; 6] = ['/', '.', '#', '$', '[', ']'];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Identity '{0}' cannot be used in a conversation address")]
    MalformedIdentity(String),
}

/// Derives the conversation key for a (student, teacher) pair.
///
/// Fails instead of producing an ambiguous key when either identity is empty,
/// contains the separator, or contains a path metacharacter.
pub fn address_of(student: &Identity, teacher: &Identity) -> Result<ConversationId, AddressError> {
    check(student)?;
    check(teacher)?;
    Ok(ConversationId::from_raw(format!(
        "{}{}{}",
        student, SEPARATOR, teacher
    )))
}

fn check(identity: &Identity) -> Result<(), AddressError> {
    let raw = identity.as_str();
    if raw.is_empty() || raw.contains(SEPARATOR) || raw.contains(PATH_METACHARACTERS) {
        return Err(AddressError::MalformedIdentity(raw.to_string()));
    }
    Ok(())
}
