//! crates/diary_core/src/thread.rs
//!
//! Thread store adapter: appends entries to a conversation, reads the whole
//! conversation back, and patches the advice field of one entry. Snapshots are
//! decoded and validated here so nothing downstream handles raw JSON.

use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::{ConversationId, Entry, EntryId, Role, StoredEntry};
use crate::error::{DeskError, DeskResult};
use crate::paths;
use crate::ports::{ClientContext, PortError, PortResult, TreeStore};

//=========================================================================================
// Wire Format
//=========================================================================================

const DATE: &str = "date";
const WORD: &str = "kotoba";
const SENTENCE: &str = "bun";
const KANJI: &str = "kanji";
const MEMO: &str = "memo";
const SENDER: &str = "sender";
const TIMESTAMP: &str = "timestamp";
const ADVICE: &str = "advice";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("expected an object")]
    NotAnObject,
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("field '{0}' is not a string")]
    NotAString(&'static str),
    #[error("unknown sender '{0}'")]
    UnknownSender(String),
}

/// Reads an optional string field; `null` counts as absent.
fn optional_text(object: &Map<String, Value>, field: &'static str) -> Result<Option<String>, DecodeError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(DecodeError::NotAString(field)),
    }
}

fn required_text(object: &Map<String, Value>, field: &'static str) -> Result<String, DecodeError> {
    optional_text(object, field)?.ok_or(DecodeError::MissingField(field))
}

/// Decodes one stored entry.
///
/// `sender` and `timestamp` are required. The form fields may be absent (an
/// empty form field is stored as nothing) and decode as empty strings.
pub fn decode_entry(value: &Value) -> Result<Entry, DecodeError> {
    let object = value.as_object().ok_or(DecodeError::NotAnObject)?;
    let sender_tag = required_text(object, SENDER)?;
    let sender = Role::from_tag(&sender_tag).ok_or(DecodeError::UnknownSender(sender_tag))?;
    let text = |field| optional_text(object, field).map(Option::unwrap_or_default);

    Ok(Entry {
        date: text(DATE)?,
        word: text(WORD)?,
        sentence: text(SENTENCE)?,
        kanji: text(KANJI)?,
        memo: text(MEMO)?,
        sender,
        timestamp: required_text(object, TIMESTAMP)?,
        advice: optional_text(object, ADVICE)?,
    })
}

pub fn encode_entry(entry: &Entry) -> Value {
    let mut value = json!({
        DATE: entry.date,
        WORD: entry.word,
        SENTENCE: entry.sentence,
        KANJI: entry.kanji,
        MEMO: entry.memo,
        SENDER: entry.sender.as_tag(),
        TIMESTAMP: entry.timestamp,
    });
    if let (Some(advice), Some(object)) = (&entry.advice, value.as_object_mut()) {
        object.insert(ADVICE.to_string(), Value::String(advice.clone()));
    }
    value
}

/// Decodes a `messages` snapshot into entries in insertion order, keeping the
/// per-entry decode result.
pub fn decode_messages(snapshot: Option<&Value>) -> Result<Vec<(EntryId, Result<Entry, DecodeError>)>, DecodeError> {
    let Some(snapshot) = snapshot else {
        return Ok(Vec::new());
    };
    let object = snapshot.as_object().ok_or(DecodeError::NotAnObject)?;
    let mut decoded: Vec<_> = object
        .iter()
        .map(|(id, value)| (EntryId::new(id.as_str()), decode_entry(value)))
        .collect();
    // Push keys sort in insertion order.
    decoded.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(decoded)
}

//=========================================================================================
// ThreadStore
//=========================================================================================

pub struct ThreadStore {
    store: Arc<dyn TreeStore>,
}

impl ThreadStore {
    pub fn new(ctx: &ClientContext) -> Self {
        Self {
            store: ctx.store.clone(),
        }
    }

    /// Stores `entry` under the conversation and returns its generated id.
    /// The entry is visible to the next `load_entries` once this returns.
    pub async fn append_entry(&self, conversation: &ConversationId, entry: &Entry) -> PortResult<EntryId> {
        let key = self
            .store
            .push(&paths::messages(conversation), encode_entry(entry))
            .await?;
        info!("Appended entry {} to conversation {}", key, conversation);
        Ok(EntryId::new(key))
    }

    /// Every entry of the conversation in insertion order. A conversation with
    /// no entries is an empty list. Entries that fail to decode are skipped.
    pub async fn load_entries(&self, conversation: &ConversationId) -> DeskResult<Vec<StoredEntry>> {
        let snapshot = self.store.get(&paths::messages(conversation)).await?;
        let entries = decode_messages(snapshot.as_ref())?
            .into_iter()
            .filter_map(|(id, decoded)| match decoded {
                Ok(entry) => Some(StoredEntry { id, entry }),
                Err(e) => {
                    warn!("Skipping entry {} in {}: {}", id, conversation, e);
                    None
                }
            })
            .collect();
        Ok(entries)
    }

    /// Patches only the advice field of an existing entry. Whatever advice was
    /// there before is overwritten.
    pub async fn set_advice(&self, conversation: &ConversationId, entry: &EntryId, text: &str) -> DeskResult<()> {
        let mut fields = Map::new();
        fields.insert(ADVICE.to_string(), Value::String(text.to_string()));
        match self.store.update(&paths::message(conversation, entry), fields).await {
            Ok(()) => Ok(()),
            Err(PortError::NotFound(_)) => Err(DeskError::NotFound {
                conversation: conversation.clone(),
                entry: entry.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
