//! crates/diary_core/src/error.rs
//!
//! The error type returned by the page-level operations.

use crate::addressing::AddressError;
use crate::domain::{ConversationId, EntryId, Identity};
use crate::ports::PortError;
use crate::thread::DecodeError;

#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    /// The student has no pairing edge, so no conversation can be addressed.
    #[error("No teacher is assigned to student {0}")]
    NotAssigned(Identity),

    /// The advice target does not exist under the conversation.
    #[error("Entry {entry} not found in conversation {conversation}")]
    NotFound {
        conversation: ConversationId,
        entry: EntryId,
    },

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("Malformed entry: {0}")]
    Decode(#[from] DecodeError),

    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),
}

pub type DeskResult<T> = Result<T, DeskError>;
