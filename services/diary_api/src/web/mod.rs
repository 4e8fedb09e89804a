pub mod auth;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod views;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use auth::logout_handler;
use middleware::{require_student, require_teacher};
use rest::{
    health_handler, student_thread_handler, student_thread_html_handler, submit_advice_handler,
    submit_diary_handler, teacher_threads_handler, teacher_threads_html_handler,
};
use state::AppState;

/// Builds the page routes. Every role route sits behind that role's session gate.
pub fn router(state: Arc<AppState>) -> Router {
    let student_routes = Router::new()
        .route("/student/thread", get(student_thread_handler))
        .route("/student/thread.html", get(student_thread_html_handler))
        .route("/student/entries", post(submit_diary_handler))
        .route("/student/logout", post(logout_handler))
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_student));

    let teacher_routes = Router::new()
        .route("/teacher/threads", get(teacher_threads_handler))
        .route("/teacher/threads.html", get(teacher_threads_html_handler))
        .route("/teacher/advice", post(submit_advice_handler))
        .route("/teacher/logout", post(logout_handler))
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_teacher));

    Router::new()
        .route("/health", get(health_handler))
        .merge(student_routes)
        .merge(teacher_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
