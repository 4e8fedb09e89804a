//! services/diary_api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the browser pages and the API.
//! Responses mirror the core view models one-to-one so they can carry OpenAPI
//! schemas without the core crate knowing about the web layer.

use diary_core::render::{AdviceTarget, Annotation, AnnotationStyle, RenderedEntry, RenderedThread};
use diary_core::{Role, StudentThread, StudentView, TeacherView};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

//=========================================================================================
// Requests
//=========================================================================================

/// A new diary entry as typed into the student form.
#[derive(Deserialize, Debug, ToSchema)]
pub struct DiaryRequest {
    #[serde(default)]
    pub date: String,
    #[serde(default, alias = "kotoba")]
    pub word: String,
    #[serde(default, alias = "bun")]
    pub sentence: String,
    #[serde(default)]
    pub kanji: String,
    #[serde(default)]
    pub memo: String,
}

impl From<DiaryRequest> for diary_core::DiaryForm {
    fn from(req: DiaryRequest) -> Self {
        Self {
            date: req.date,
            word: req.word,
            sentence: req.sentence,
            kanji: req.kanji,
            memo: req.memo,
        }
    }
}

/// Advice typed next to one entry on the teacher page.
#[derive(Deserialize, Debug, ToSchema)]
pub struct AdviceRequest {
    pub conversation_id: String,
    pub entry_id: String,
    pub advice: String,
}

//=========================================================================================
// Responses
//=========================================================================================

#[derive(Serialize, Debug, ToSchema)]
pub struct AdviceResponse {
    /// False when the advice was blank and nothing was sent.
    pub saved: bool,
    pub notice: Option<String>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct AnnotationDto {
    /// One of `advice`, `placeholder`, `informational`.
    pub style: String,
    pub text: String,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct AdviceTargetDto {
    pub conversation_id: String,
    pub entry_id: String,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct EntryDto {
    pub id: String,
    pub date: String,
    pub word: String,
    pub sentence: String,
    pub kanji: String,
    pub memo: String,
    pub sender: String,
    pub annotation: Option<AnnotationDto>,
    /// Present where the viewer may submit advice for this entry.
    pub advice_input: Option<AdviceTargetDto>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ThreadDto {
    pub conversation_id: String,
    /// Newest first.
    pub entries: Vec<EntryDto>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct StudentPageResponse {
    pub name: String,
    pub teacher: String,
    pub thread: ThreadDto,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct StudentSectionDto {
    pub student: String,
    pub name: String,
    pub thread: ThreadDto,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct TeacherPageResponse {
    pub name: String,
    pub students: Vec<StudentSectionDto>,
}

//=========================================================================================
// Conversions from the core view models
//=========================================================================================

fn style_name(style: AnnotationStyle) -> &'static str {
    match style {
        AnnotationStyle::Advice => "advice",
        AnnotationStyle::Placeholder => "placeholder",
        AnnotationStyle::Informational => "informational",
    }
}

fn role_name(role: Role) -> String {
    role.as_tag().to_string()
}

impl From<Annotation> for AnnotationDto {
    fn from(a: Annotation) -> Self {
        Self {
            style: style_name(a.style).to_string(),
            text: a.text,
        }
    }
}

impl From<AdviceTarget> for AdviceTargetDto {
    fn from(t: AdviceTarget) -> Self {
        Self {
            conversation_id: t.conversation_id.to_string(),
            entry_id: t.entry_id.to_string(),
        }
    }
}

impl From<RenderedEntry> for EntryDto {
    fn from(e: RenderedEntry) -> Self {
        Self {
            id: e.id.to_string(),
            date: e.date,
            word: e.word,
            sentence: e.sentence,
            kanji: e.kanji,
            memo: e.memo,
            sender: role_name(e.sender),
            annotation: e.annotation.map(Into::into),
            advice_input: e.advice_input.map(Into::into),
        }
    }
}

impl From<RenderedThread> for ThreadDto {
    fn from(t: RenderedThread) -> Self {
        Self {
            conversation_id: t.conversation_id.to_string(),
            entries: t.entries.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<StudentView> for StudentPageResponse {
    fn from(v: StudentView) -> Self {
        Self {
            name: v.name,
            teacher: v.teacher.to_string(),
            thread: v.thread.into(),
        }
    }
}

impl From<StudentThread> for StudentSectionDto {
    fn from(s: StudentThread) -> Self {
        Self {
            student: s.student.to_string(),
            name: s.name,
            thread: s.thread.into(),
        }
    }
}

impl From<TeacherView> for TeacherPageResponse {
    fn from(v: TeacherView) -> Self {
        Self {
            name: v.name,
            students: v.students.into_iter().map(Into::into).collect(),
        }
    }
}
