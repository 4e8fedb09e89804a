//! services/diary_api/src/web/auth.rs
//!
//! Sign-out. Sign-in and registration belong to the hosted login surface.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect},
    Extension,
};
use diary_core::{Authenticated, GateDecision, SessionGate};
use std::sync::Arc;
use tracing::{error, info};

use crate::error::Notice;
use crate::web::middleware::session_credential;
use crate::web::state::AppState;

const CLEAR_SESSION_COOKIE: &str = "session=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";

/// POST /{role}/logout - End the session and go back to the login surface
#[utoipa::path(
    post,
    path = "/{role}/logout",
    params(("role" = String, Path, description = "`student` or `teacher`")),
    responses(
        (status = 303, description = "Signed out; redirected to the login surface"),
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(who): Extension<Authenticated>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, Notice> {
    let credential = session_credential(&headers);
    let gate = SessionGate::new(&state.ctx, who.role, state.config.login_path.clone());

    let decision = gate.sign_out(credential.as_deref()).await.map_err(|e| {
        error!("Failed to sign out: {:?}", e);
        Notice::from(e)
    })?;
    info!("{} signed out", who.identity);

    let to = match decision {
        GateDecision::Redirect(to) => to,
        GateDecision::Enter(_) => state.config.login_path.clone(),
    };
    Ok((
        [(header::SET_COOKIE, CLEAR_SESSION_COOKIE)],
        Redirect::to(&to),
    ))
}
