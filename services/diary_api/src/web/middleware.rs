//! services/diary_api/src/web/middleware.rs
//!
//! The session gate in front of the role pages.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use diary_core::{GateDecision, Role, SessionGate};
use std::sync::Arc;
use tracing::error;

use crate::error::Notice;
use crate::web::state::AppState;

/// Reads the session credential from the `session` cookie, or from an
/// `Authorization: Bearer` header.
pub fn session_credential(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| c.trim().strip_prefix("session="))
        .filter(|s| !s.is_empty());
    let from_bearer = || {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .filter(|s| !s.is_empty())
    };
    from_cookie.or_else(from_bearer).map(str::to_string)
}

/// Gate for the student page.
pub async fn require_student(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    gate(Role::Student, &state, req, next).await
}

/// Gate for the teacher page.
pub async fn require_teacher(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    gate(Role::Teacher, &state, req, next).await
}

/// Lets the request through with the `Authenticated` principal in its
/// extensions, or redirects to the login surface before any handler runs.
async fn gate(role: Role, state: &AppState, mut req: Request, next: Next) -> Response {
    let credential = session_credential(req.headers());
    let session_gate = SessionGate::new(&state.ctx, role, state.config.login_path.clone());

    match session_gate.check(credential.as_deref()).await {
        Ok(GateDecision::Enter(who)) => {
            req.extensions_mut().insert(who);
            next.run(req).await
        }
        Ok(GateDecision::Redirect(to)) => Redirect::to(&to).into_response(),
        Err(e) => {
            error!("Failed to validate session: {:?}", e);
            Notice::from(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn credential_comes_from_cookie_then_bearer() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_credential(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok-b"));
        assert_eq!(session_credential(&headers).as_deref(), Some("tok-b"));

        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; session=tok-c"));
        assert_eq!(session_credential(&headers).as_deref(), Some("tok-c"));
    }

    #[test]
    fn empty_cookie_value_is_no_credential() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert_eq!(session_credential(&headers), None);
    }
}
