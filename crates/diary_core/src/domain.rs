//! crates/diary_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage backend; the wire shape of an
//! entry is handled by `thread::decode_entry` at the store boundary.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque, platform-issued token identifying a signed-in principal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two roles a principal can act in. Also used as the sender tag of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    /// Display name used when a user has no stored name.
    pub fn placeholder_name(self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Teacher => "Teacher",
        }
    }

    /// The tag stored in the `sender` field of an entry.
    pub fn as_tag(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "student" => Some(Role::Student),
            "teacher" => Some(Role::Teacher),
            _ => None,
        }
    }
}

// Represents a user as seen by this system - created externally at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub identity: Identity,
    pub display_name: String,
    pub role: Role,
}

/// The storage key shared by a paired student and teacher.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Only `addressing::address_of` builds new ids; this wraps ids that come
    /// back from a client (e.g. an advice form) and must be treated as opaque.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The key assigned to an entry by the store when it is appended.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One diary submission plus its optional teacher advice.
///
/// Everything except `advice` is immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// User-supplied and not validated further.
    pub date: String,
    pub word: String,
    pub sentence: String,
    pub kanji: String,
    pub memo: String,
    pub sender: Role,
    /// Client clock at submission, ISO-8601.
    pub timestamp: String,
    pub advice: Option<String>,
}

impl Entry {
    /// Builds a fresh student submission stamped with the given clock reading.
    pub fn from_student(form: DiaryForm, now: DateTime<Utc>) -> Self {
        Self {
            date: form.date,
            word: form.word,
            sentence: form.sentence,
            kanji: form.kanji,
            memo: form.memo,
            sender: Role::Student,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            advice: None,
        }
    }
}

/// An entry together with the id the store assigned to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub id: EntryId,
    pub entry: Entry,
}

/// The fields a student fills in on the diary form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiaryForm {
    pub date: String,
    pub word: String,
    pub sentence: String,
    pub kanji: String,
    pub memo: String,
}
