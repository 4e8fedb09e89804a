//! crates/diary_core/src/session.rs
//!
//! Session gate shared by the student and teacher pages. Nothing on a role page
//! runs until the gate has resolved to `Authenticated`; any other outcome is a
//! redirect to the login surface.

use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::{Identity, Role};
use crate::ports::{ClientContext, IdentityProvider, PortResult};

/// Who is on the page, once the gate has let them through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub identity: Identity,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(Authenticated),
}

impl SessionState {
    /// Applies an identity-provider notification.
    pub fn on_identity(self, identity: Option<Identity>, role: Role) -> Self {
        match identity {
            Some(identity) => SessionState::Authenticated(Authenticated { identity, role }),
            None => SessionState::Unauthenticated,
        }
    }

    /// Explicit sign-out always lands in `Unauthenticated`.
    pub fn signed_out(self) -> Self {
        SessionState::Unauthenticated
    }
}

/// What the page does after the gate has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Enter(Authenticated),
    Redirect(String),
}

pub struct SessionGate {
    auth: Arc<dyn IdentityProvider>,
    role: Role,
    login_path: String,
}

impl SessionGate {
    pub fn new(ctx: &ClientContext, role: Role, login_path: impl Into<String>) -> Self {
        Self {
            auth: ctx.auth.clone(),
            role,
            login_path: login_path.into(),
        }
    }

    /// Resolves the session behind `credential`. A missing credential never
    /// reaches the provider.
    pub async fn check(&self, credential: Option<&str>) -> PortResult<GateDecision> {
        let identity = match credential {
            Some(credential) => self.auth.current_identity(credential).await?,
            None => None,
        };
        Ok(self.decide(SessionState::Unauthenticated.on_identity(identity, self.role)))
    }

    /// Ends the session and sends the user to the login surface.
    pub async fn sign_out(&self, credential: Option<&str>) -> PortResult<GateDecision> {
        if let Some(credential) = credential {
            self.auth.sign_out(credential).await?;
            info!("Session signed out");
        }
        Ok(self.decide(SessionState::Unauthenticated.signed_out()))
    }

    fn decide(&self, state: SessionState) -> GateDecision {
        match state {
            SessionState::Authenticated(who) => GateDecision::Enter(who),
            SessionState::Unauthenticated => {
                debug!("Unauthenticated on a {:?} page, redirecting", self.role);
                GateDecision::Redirect(self.login_path.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemorySessions, MemoryTree};

    async fn gate(role: Role) -> (Arc<MemorySessions>, SessionGate) {
        let sessions = Arc::new(MemorySessions::new());
        sessions.sign_in("good", Identity::new("u1")).await;
        let ctx = ClientContext::new(Arc::new(MemoryTree::new()), sessions.clone());
        (sessions, SessionGate::new(&ctx, role, "/index.html"))
    }

    #[tokio::test]
    async fn valid_session_enters_with_page_role() {
        let (_, gate) = gate(Role::Teacher).await;
        assert_eq!(
            gate.check(Some("good")).await.unwrap(),
            GateDecision::Enter(Authenticated {
                identity: Identity::new("u1"),
                role: Role::Teacher,
            })
        );
    }

    #[tokio::test]
    async fn missing_or_unknown_session_redirects() {
        let (_, gate) = gate(Role::Student).await;
        let redirect = GateDecision::Redirect("/index.html".to_string());
        assert_eq!(gate.check(None).await.unwrap(), redirect);
        assert_eq!(gate.check(Some("stale")).await.unwrap(), redirect);
    }

    #[tokio::test]
    async fn sign_out_ends_the_session() {
        let (sessions, gate) = gate(Role::Student).await;
        let decision = gate.sign_out(Some("good")).await.unwrap();

        assert_eq!(decision, GateDecision::Redirect("/index.html".to_string()));
        assert_eq!(sessions.current_identity("good").await.unwrap(), None);
        assert!(matches!(gate.check(Some("good")).await.unwrap(), GateDecision::Redirect(_)));
    }

    #[test]
    fn session_loss_returns_to_unauthenticated() {
        let state = SessionState::Unauthenticated.on_identity(Some(Identity::new("u1")), Role::Student);
        assert!(matches!(state, SessionState::Authenticated(_)));
        assert_eq!(state.clone().on_identity(None, Role::Student), SessionState::Unauthenticated);
        assert_eq!(state.signed_out(), SessionState::Unauthenticated);
    }
}
