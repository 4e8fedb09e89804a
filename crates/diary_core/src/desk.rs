//! crates/diary_core/src/desk.rs
//!
//! The two role pages expressed as named operations. Each user action maps to
//! one method here; the UI layer calls it and shows the returned view.
//! Every call re-fetches what it needs, nothing is cached between calls.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::addressing::address_of;
use crate::advice::{AdviceAnnotator, AdviceOutcome};
use crate::domain::{ConversationId, DiaryForm, Entry, EntryId, Identity, Role};
use crate::error::{DeskError, DeskResult};
use crate::identity::IdentityResolver;
use crate::pairing::PairingDirectory;
use crate::ports::ClientContext;
use crate::render::{render, RenderedThread};
use crate::thread::ThreadStore;

//=========================================================================================
// Student Desk
//=========================================================================================

#[derive(Debug, Clone, Serialize)]
pub struct StudentView {
    pub name: String,
    pub teacher: Identity,
    pub thread: RenderedThread,
}

pub struct StudentDesk {
    names: IdentityResolver,
    pairing: PairingDirectory,
    threads: ThreadStore,
}

impl StudentDesk {
    pub fn new(ctx: &ClientContext) -> Self {
        Self {
            names: IdentityResolver::new(ctx),
            pairing: PairingDirectory::new(ctx),
            threads: ThreadStore::new(ctx),
        }
    }

    /// Loads the student's page: greeting name, then the thread with their
    /// teacher. Fails with `NotAssigned` when no teacher is paired.
    pub async fn open(&self, student: &Identity) -> DeskResult<StudentView> {
        let name = self.names.display_name(student, Role::Student).await?;
        let (teacher, conversation) = self.conversation_of(student).await?;
        let thread = self.load_thread(&conversation).await?;
        Ok(StudentView {
            name,
            teacher,
            thread,
        })
    }

    /// Appends a new diary entry and returns the refreshed page.
    pub async fn submit_diary(&self, student: &Identity, form: DiaryForm) -> DeskResult<StudentView> {
        let (_, conversation) = self.conversation_of(student).await?;
        let entry = Entry::from_student(form, Utc::now());
        let id = self.threads.append_entry(&conversation, &entry).await?;
        info!("Student {} submitted diary entry {}", student, id);
        self.open(student).await
    }

    async fn conversation_of(&self, student: &Identity) -> DeskResult<(Identity, ConversationId)> {
        let teacher = self.pairing.resolve_teacher_for(student).await?;
        let conversation = address_of(student, &teacher)?;
        Ok((teacher, conversation))
    }

    async fn load_thread(&self, conversation: &ConversationId) -> DeskResult<RenderedThread> {
        let entries = self.threads.load_entries(conversation).await?;
        Ok(render(conversation, &entries, Role::Student))
    }
}

//=========================================================================================
// Teacher Desk
//=========================================================================================

#[derive(Debug, Clone, Serialize)]
pub struct StudentThread {
    pub student: Identity,
    pub name: String,
    pub thread: RenderedThread,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeacherView {
    pub name: String,
    /// Assigned students with at least one entry, in identity order.
    pub students: Vec<StudentThread>,
}

pub struct TeacherDesk {
    names: IdentityResolver,
    pairing: PairingDirectory,
    threads: ThreadStore,
    annotator: AdviceAnnotator,
}

impl TeacherDesk {
    pub fn new(ctx: &ClientContext) -> Self {
        Self {
            names: IdentityResolver::new(ctx),
            pairing: PairingDirectory::new(ctx),
            threads: ThreadStore::new(ctx),
            annotator: AdviceAnnotator::new(ctx),
        }
    }

    /// Loads every assigned student's thread, awaiting each one in turn. A
    /// student whose conversation cannot be addressed or decoded is skipped so
    /// the rest of the page still renders.
    pub async fn open(&self, teacher: &Identity) -> DeskResult<TeacherView> {
        let name = self.names.display_name(teacher, Role::Teacher).await?;
        let students = self.pairing.resolve_students_for(teacher).await?;
        info!("Teacher {} has {} assigned students", teacher, students.len());

        let mut threads = Vec::with_capacity(students.len());
        for student in students {
            let conversation = match address_of(&student, teacher) {
                Ok(conversation) => conversation,
                Err(e) => {
                    warn!("Skipping student {} of teacher {}: {}", student, teacher, e);
                    continue;
                }
            };
            let entries = match self.threads.load_entries(&conversation).await {
                Ok(entries) => entries,
                Err(DeskError::Decode(e)) => {
                    warn!("Skipping unreadable conversation {}: {}", conversation, e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            if entries.is_empty() {
                continue;
            }
            let user = self.names.user(&student, Role::Student).await?;
            threads.push(StudentThread {
                student: user.identity,
                name: user.display_name,
                thread: render(&conversation, &entries, Role::Teacher),
            });
        }

        Ok(TeacherView {
            name,
            students: threads,
        })
    }

    /// Writes advice on an entry of one of this teacher's conversations.
    /// A conversation that belongs to no assigned student is treated like a
    /// missing entry.
    pub async fn submit_advice(
        &self,
        teacher: &Identity,
        conversation: &ConversationId,
        entry: &EntryId,
        text: &str,
    ) -> DeskResult<AdviceOutcome> {
        if text.trim().is_empty() {
            return Ok(AdviceOutcome::Ignored);
        }
        let students = self.pairing.resolve_students_for(teacher).await?;
        let owned = students
            .iter()
            .filter_map(|student| address_of(student, teacher).ok())
            .any(|address| &address == conversation);
        if !owned {
            return Err(DeskError::NotFound {
                conversation: conversation.clone(),
                entry: entry.clone(),
            });
        }
        self.annotator.submit_advice(conversation, entry, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemorySessions, MemoryTree};
    use crate::render::{AnnotationStyle, AWAITING_ADVICE};
    use serde_json::json;
    use std::sync::Arc;

    async fn context() -> ClientContext {
        let tree = Arc::new(MemoryTree::new());
        tree.set("pairs", json!({ "S1": "T1", "S2": "T1", "S3": "T2" }))
            .await
            .unwrap();
        tree.set("users", json!({ "S1": { "name": "Aiko" }, "T1": { "name": "Sato" } }))
            .await
            .unwrap();
        ClientContext::new(tree, Arc::new(MemorySessions::new()))
    }

    fn form(memo: &str) -> DiaryForm {
        DiaryForm {
            date: "2024-06-01".into(),
            word: "みず".into(),
            sentence: "みずをのむ。".into(),
            kanji: "水".into(),
            memo: memo.into(),
        }
    }

    fn id(raw: &str) -> Identity {
        Identity::new(raw)
    }

    #[tokio::test]
    async fn student_page_starts_empty() {
        let ctx = context().await;
        let view = StudentDesk::new(&ctx).open(&id("S1")).await.unwrap();

        assert_eq!(view.name, "Aiko");
        assert_eq!(view.teacher, id("T1"));
        assert_eq!(view.thread.conversation_id.as_str(), "S1_T1");
        assert!(view.thread.is_empty());
    }

    #[tokio::test]
    async fn unassigned_student_is_blocked() {
        let ctx = context().await;
        let desk = StudentDesk::new(&ctx);

        assert!(matches!(desk.open(&id("S9")).await, Err(DeskError::NotAssigned(_))));
        assert!(matches!(
            desk.submit_diary(&id("S9"), form("x")).await,
            Err(DeskError::NotAssigned(_))
        ));
    }

    #[tokio::test]
    async fn submissions_show_newest_first() {
        let ctx = context().await;
        let desk = StudentDesk::new(&ctx);
        desk.submit_diary(&id("S1"), form("first")).await.unwrap();
        let view = desk.submit_diary(&id("S1"), form("second")).await.unwrap();

        let memos: Vec<&str> = view.thread.entries.iter().map(|e| e.memo.as_str()).collect();
        assert_eq!(memos, vec!["second", "first"]);
        assert!(view.thread.entries.iter().all(|e| e.sender == Role::Student));
    }

    #[tokio::test]
    async fn teacher_sees_only_own_students_with_entries() {
        let ctx = context().await;
        let students = StudentDesk::new(&ctx);
        students.submit_diary(&id("S1"), form("from s1")).await.unwrap();
        students.submit_diary(&id("S3"), form("from s3")).await.unwrap();

        let view = TeacherDesk::new(&ctx).open(&id("T1")).await.unwrap();

        assert_eq!(view.name, "Sato");
        assert_eq!(view.students.len(), 1);
        let s1 = &view.students[0];
        assert_eq!(s1.student, id("S1"));
        assert_eq!(s1.name, "Aiko");
        let entry = &s1.thread.entries[0];
        assert_eq!(entry.annotation.as_ref().map(|a| a.text.as_str()), Some(AWAITING_ADVICE));
        assert!(entry.advice_input.is_some());
    }

    #[tokio::test]
    async fn broken_students_do_not_hide_the_others() {
        let tree = Arc::new(MemoryTree::new());
        tree.set("pairs", json!({ "S1": "T1", "S2": "T1", "bad_id": "T1" }))
            .await
            .unwrap();
        tree.set("chats/S2_T1/messages", json!("corrupt")).await.unwrap();
        let ctx = ClientContext::new(tree, Arc::new(MemorySessions::new()));
        StudentDesk::new(&ctx).submit_diary(&id("S1"), form("still here")).await.unwrap();

        let view = TeacherDesk::new(&ctx).open(&id("T1")).await.unwrap();

        assert_eq!(view.students.len(), 1);
        assert_eq!(view.students[0].student, id("S1"));
        assert_eq!(view.students[0].name, "Student");
        assert_eq!(view.students[0].thread.entries[0].memo, "still here");
    }

    #[tokio::test]
    async fn advice_round_trip_is_visible_to_both_sides() {
        let ctx = context().await;
        let students = StudentDesk::new(&ctx);
        let teachers = TeacherDesk::new(&ctx);
        let view = students.submit_diary(&id("S1"), form("m")).await.unwrap();
        let target = {
            let teacher_view = teachers.open(&id("T1")).await.unwrap();
            teacher_view.students[0].thread.entries[0].advice_input.clone().unwrap()
        };
        assert_eq!(target.entry_id, view.thread.entries[0].id);

        let outcome = teachers
            .submit_advice(&id("T1"), &target.conversation_id, &target.entry_id, "nice work")
            .await
            .unwrap();
        assert_eq!(outcome, AdviceOutcome::Saved);

        let student_entry = students.open(&id("S1")).await.unwrap().thread.entries[0].clone();
        let teacher_entry = teachers.open(&id("T1")).await.unwrap().students[0].thread.entries[0].clone();
        for entry in [student_entry, teacher_entry] {
            let annotation = entry.annotation.unwrap();
            assert_eq!(annotation.style, AnnotationStyle::Advice);
            assert_eq!(annotation.text, "nice work");
        }
    }

    #[tokio::test]
    async fn advice_outside_own_conversations_is_not_found() {
        let ctx = context().await;
        let view = StudentDesk::new(&ctx).submit_diary(&id("S3"), form("m")).await.unwrap();
        let entry = view.thread.entries[0].id.clone();

        let err = TeacherDesk::new(&ctx)
            .submit_advice(&id("T1"), &view.thread.conversation_id, &entry, "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, DeskError::NotFound { .. }));

        let err = TeacherDesk::new(&ctx)
            .submit_advice(&id("T1"), &ConversationId::from_raw("S1_T1"), &EntryId::new("gone"), "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, DeskError::NotFound { .. }));
    }
}
