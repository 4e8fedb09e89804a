//! Advice annotator (teacher side).

use tracing::info;

use crate::domain::{ConversationId, EntryId};
use crate::error::DeskResult;
use crate::ports::ClientContext;
use crate::thread::ThreadStore;

/// What happened to an advice submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdviceOutcome {
    /// Blank text; nothing was sent.
    Ignored,
    Saved,
}

pub struct AdviceAnnotator {
    threads: ThreadStore,
}

impl AdviceAnnotator {
    pub fn new(ctx: &ClientContext) -> Self {
        Self {
            threads: ThreadStore::new(ctx),
        }
    }

    /// Attaches `text` as the advice of an existing entry. Blank text is
    /// dropped without a round-trip. A missing target is `DeskError::NotFound`.
    pub async fn submit_advice(
        &self,
        conversation: &ConversationId,
        entry: &EntryId,
        text: &str,
    ) -> DeskResult<AdviceOutcome> {
        if text.trim().is_empty() {
            return Ok(AdviceOutcome::Ignored);
        }
        self.threads.set_advice(conversation, entry, text).await?;
        info!("Advice saved on entry {} in {}", entry, conversation);
        Ok(AdviceOutcome::Saved)
    }
}
