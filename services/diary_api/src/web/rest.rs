//! services/diary_api/src/web/rest.rs
//!
//! Contains the Axum handlers for the page commands and the master definition
//! for the OpenAPI specification. Each handler maps one user action onto one
//! desk operation; the browser re-renders from the response.

use crate::error::{Notice, NoticeBody};
use crate::web::protocol::{
    AdviceRequest, AdviceResponse, AdviceTargetDto, AnnotationDto, DiaryRequest, EntryDto,
    StudentPageResponse, StudentSectionDto, TeacherPageResponse, ThreadDto,
};
use crate::web::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    Extension,
};
use diary_core::{
    AdviceOutcome, Authenticated, ConversationId, EntryId, StudentDesk, StudentView, TeacherDesk,
    TeacherView,
};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        student_thread_handler,
        student_thread_html_handler,
        submit_diary_handler,
        teacher_threads_handler,
        teacher_threads_html_handler,
        submit_advice_handler,
        crate::web::auth::logout_handler,
        health_handler,
    ),
    components(
        schemas(
            DiaryRequest, AdviceRequest, AdviceResponse, NoticeBody, AnnotationDto,
            AdviceTargetDto, EntryDto, ThreadDto, StudentPageResponse, StudentSectionDto,
            TeacherPageResponse,
        )
    ),
    tags(
        (name = "Diary API", description = "Student diary submissions and teacher advice.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared loaders
//=========================================================================================

async fn open_student(state: &AppState, who: &Authenticated) -> Result<StudentView, Notice> {
    Ok(StudentDesk::new(&state.ctx).open(&who.identity).await?)
}

async fn open_teacher(state: &AppState, who: &Authenticated) -> Result<TeacherView, Notice> {
    Ok(TeacherDesk::new(&state.ctx).open(&who.identity).await?)
}

fn html_or_notice(rendered: Result<String, crate::error::ApiError>) -> Result<Html<String>, Notice> {
    rendered.map(Html).map_err(|e| {
        error!("Failed to render page: {}", e);
        Notice::internal()
    })
}

//=========================================================================================
// Student Page
//=========================================================================================

/// Open the student page: greeting name and the thread with the assigned teacher.
#[utoipa::path(
    get,
    path = "/student/thread",
    responses(
        (status = 200, description = "The student's thread, newest entry first", body = StudentPageResponse),
        (status = 303, description = "Not signed in; redirected to the login surface"),
        (status = 409, description = "No teacher assigned", body = NoticeBody)
    )
)]
pub async fn student_thread_handler(
    State(state): State<Arc<AppState>>,
    Extension(who): Extension<Authenticated>,
) -> Result<Json<StudentPageResponse>, Notice> {
    Ok(Json(open_student(&state, &who).await?.into()))
}

/// The student page as an HTML fragment.
#[utoipa::path(
    get,
    path = "/student/thread.html",
    responses(
        (status = 200, description = "Rendered student thread", body = String, content_type = "text/html"),
        (status = 409, description = "No teacher assigned", body = NoticeBody)
    )
)]
pub async fn student_thread_html_handler(
    State(state): State<Arc<AppState>>,
    Extension(who): Extension<Authenticated>,
) -> Result<Html<String>, Notice> {
    let view = open_student(&state, &who).await?;
    html_or_notice(state.views.student_page(&view))
}

/// Submit a new diary entry and get the refreshed thread back.
#[utoipa::path(
    post,
    path = "/student/entries",
    request_body = DiaryRequest,
    responses(
        (status = 201, description = "Entry stored", body = StudentPageResponse),
        (status = 409, description = "No teacher assigned", body = NoticeBody)
    )
)]
pub async fn submit_diary_handler(
    State(state): State<Arc<AppState>>,
    Extension(who): Extension<Authenticated>,
    Json(req): Json<DiaryRequest>,
) -> Result<impl IntoResponse, Notice> {
    let view = StudentDesk::new(&state.ctx)
        .submit_diary(&who.identity, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(StudentPageResponse::from(view))))
}

//=========================================================================================
// Teacher Page
//=========================================================================================

/// Open the teacher page: one thread per assigned student with entries.
#[utoipa::path(
    get,
    path = "/teacher/threads",
    responses(
        (status = 200, description = "Threads of the assigned students", body = TeacherPageResponse),
        (status = 303, description = "Not signed in; redirected to the login surface")
    )
)]
pub async fn teacher_threads_handler(
    State(state): State<Arc<AppState>>,
    Extension(who): Extension<Authenticated>,
) -> Result<Json<TeacherPageResponse>, Notice> {
    Ok(Json(open_teacher(&state, &who).await?.into()))
}

/// The teacher page as an HTML fragment.
#[utoipa::path(
    get,
    path = "/teacher/threads.html",
    responses(
        (status = 200, description = "Rendered teacher threads", body = String, content_type = "text/html")
    )
)]
pub async fn teacher_threads_html_handler(
    State(state): State<Arc<AppState>>,
    Extension(who): Extension<Authenticated>,
) -> Result<Html<String>, Notice> {
    let view = open_teacher(&state, &who).await?;
    html_or_notice(state.views.teacher_page(&view))
}

/// Attach advice to a student's entry.
///
/// Blank advice is ignored. The page is not re-rendered; the next load shows the advice.
#[utoipa::path(
    post,
    path = "/teacher/advice",
    request_body = AdviceRequest,
    responses(
        (status = 200, description = "Advice saved, or ignored when blank", body = AdviceResponse),
        (status = 404, description = "The entry does not exist", body = NoticeBody)
    )
)]
pub async fn submit_advice_handler(
    State(state): State<Arc<AppState>>,
    Extension(who): Extension<Authenticated>,
    Json(req): Json<AdviceRequest>,
) -> Result<Json<AdviceResponse>, Notice> {
    let conversation = ConversationId::from_raw(req.conversation_id);
    let entry = EntryId::new(req.entry_id);
    let outcome = TeacherDesk::new(&state.ctx)
        .submit_advice(&who.identity, &conversation, &entry, &req.advice)
        .await?;

    let response = match outcome {
        AdviceOutcome::Saved => {
            info!("Teacher {} sent advice on {}", who.identity, entry);
            AdviceResponse {
                saved: true,
                notice: Some("Advice sent.".to_string()),
            }
        }
        AdviceOutcome::Ignored => AdviceResponse {
            saved: false,
            notice: None,
        },
    };
    Ok(Json(response))
}

//=========================================================================================
// Health
//=========================================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health_handler() -> &'static str {
    "ok"
}
