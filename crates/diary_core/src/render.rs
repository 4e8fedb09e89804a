//! crates/diary_core/src/render.rs
//!
//! Thread renderer. Turns a conversation's entries into a view model in
//! display order (newest first) and decides, per viewer, how advice is shown
//! and where an advice input is offered.
//!
//! The view model carries raw text. Markup is produced from it by templates
//! that escape every field.

use serde::Serialize;

use crate::domain::{ConversationId, EntryId, Role, StoredEntry};

/// Shown to a teacher on a student entry that has no advice yet.
pub const AWAITING_ADVICE: &str = "(no advice yet)";
/// Shown to a teacher on a teacher entry without advice text.
pub const NO_CONTENT: &str = "(no content)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedThread {
    pub conversation_id: ConversationId,
    pub entries: Vec<RenderedEntry>,
}

impl RenderedThread {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEntry {
    pub id: EntryId,
    pub date: String,
    pub word: String,
    pub sentence: String,
    pub kanji: String,
    pub memo: String,
    pub sender: Role,
    pub annotation: Option<Annotation>,
    /// Present only where the viewer may submit advice for this entry.
    pub advice_input: Option<AdviceTarget>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationStyle {
    /// Advice a teacher wrote on a student entry.
    Advice,
    /// Prompt shown to the teacher where advice is still missing.
    Placeholder,
    /// Advice field of a teacher entry, shown as plain information.
    Informational,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub style: AnnotationStyle,
    pub text: String,
}

impl Annotation {
    fn new(style: AnnotationStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

/// Keys an advice submission to one entry of one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdviceTarget {
    pub conversation_id: ConversationId,
    pub entry_id: EntryId,
}

/// Renders `entries` (in the insertion order the store returned) for `viewer`.
pub fn render(conversation: &ConversationId, entries: &[StoredEntry], viewer: Role) -> RenderedThread {
    let entries = entries
        .iter()
        .rev()
        .map(|stored| render_entry(conversation, stored, viewer))
        .collect();
    RenderedThread {
        conversation_id: conversation.clone(),
        entries,
    }
}

fn render_entry(conversation: &ConversationId, stored: &StoredEntry, viewer: Role) -> RenderedEntry {
    let entry = &stored.entry;
    let advice = entry.advice.as_deref();

    let (annotation, advice_input) = match (viewer, entry.sender) {
        (Role::Student, _) => (advice.map(|text| Annotation::new(AnnotationStyle::Advice, text)), None),
        (Role::Teacher, Role::Student) => {
            let annotation = match advice {
                Some(text) => Annotation::new(AnnotationStyle::Advice, text),
                None => Annotation::new(AnnotationStyle::Placeholder, AWAITING_ADVICE),
            };
            let target = AdviceTarget {
                conversation_id: conversation.clone(),
                entry_id: stored.id.clone(),
            };
            (Some(annotation), Some(target))
        }
        (Role::Teacher, Role::Teacher) => (
            Some(Annotation::new(
                AnnotationStyle::Informational,
                advice.unwrap_or(NO_CONTENT),
            )),
            None,
        ),
    };

    RenderedEntry {
        id: stored.id.clone(),
        date: entry.date.clone(),
        word: entry.word.clone(),
        sentence: entry.sentence.clone(),
        kanji: entry.kanji.clone(),
        memo: entry.memo.clone(),
        sender: entry.sender,
        annotation,
        advice_input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Entry;

    fn stored(id: &str, sender: Role, advice: Option<&str>) -> StoredEntry {
        StoredEntry {
            id: EntryId::new(id),
            entry: Entry {
                date: format!("date-{}", id),
                word: "w".into(),
                sentence: "s".into(),
                kanji: "k".into(),
                memo: "m".into(),
                sender,
                timestamp: "2024-01-01T00:00:00.000Z".into(),
                advice: advice.map(str::to_string),
            },
        }
    }

    fn conversation() -> ConversationId {
        ConversationId::from_raw("S_T")
    }

    #[test]
    fn newest_entry_is_displayed_first() {
        let entries = vec![
            stored("e1", Role::Student, None),
            stored("e2", Role::Student, None),
            stored("e3", Role::Student, None),
        ];

        let thread = render(&conversation(), &entries, Role::Student);
        let ids: Vec<&str> = thread.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e3", "e2", "e1"]);
    }

    #[test]
    fn empty_thread_renders_empty() {
        let thread = render(&conversation(), &[], Role::Teacher);
        assert!(thread.is_empty());
        assert_eq!(thread.conversation_id, conversation());
    }

    #[test]
    fn student_entry_without_advice_per_viewer() {
        let entries = vec![stored("e1", Role::Student, None)];

        let student = render(&conversation(), &entries, Role::Student);
        assert_eq!(student.entries[0].annotation, None);
        assert_eq!(student.entries[0].advice_input, None);

        let teacher = render(&conversation(), &entries, Role::Teacher);
        assert_eq!(
            teacher.entries[0].annotation,
            Some(Annotation::new(AnnotationStyle::Placeholder, AWAITING_ADVICE))
        );
        assert_eq!(
            teacher.entries[0].advice_input,
            Some(AdviceTarget {
                conversation_id: conversation(),
                entry_id: EntryId::new("e1"),
            })
        );
    }

    #[test]
    fn advice_is_shown_to_both_viewers() {
        let entries = vec![stored("e1", Role::Student, Some("nice work"))];
        let expected = Some(Annotation::new(AnnotationStyle::Advice, "nice work"));

        assert_eq!(render(&conversation(), &entries, Role::Student).entries[0].annotation, expected);
        let teacher = render(&conversation(), &entries, Role::Teacher);
        assert_eq!(teacher.entries[0].annotation, expected);
        // Advice can still be revised.
        assert!(teacher.entries[0].advice_input.is_some());
    }

    #[test]
    fn teacher_entries_never_offer_input() {
        let entries = vec![
            stored("e1", Role::Teacher, None),
            stored("e2", Role::Teacher, Some("note")),
        ];

        let thread = render(&conversation(), &entries, Role::Teacher);
        assert!(thread.entries.iter().all(|e| e.advice_input.is_none()));
        assert_eq!(
            thread.entries[0].annotation,
            Some(Annotation::new(AnnotationStyle::Informational, "note"))
        );
        assert_eq!(
            thread.entries[1].annotation,
            Some(Annotation::new(AnnotationStyle::Informational, NO_CONTENT))
        );
    }

    #[test]
    fn fields_are_carried_verbatim() {
        let mut entry = stored("e1", Role::Student, None);
        entry.entry.memo = "<b>bold</b> & more".into();

        let thread = render(&conversation(), &[entry], Role::Student);
        assert_eq!(thread.entries[0].memo, "<b>bold</b> & more");
        assert_eq!(thread.entries[0].date, "date-e1");
    }
}
