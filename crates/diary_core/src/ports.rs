//! crates/diary_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the external collaborators.
//! The hosted auth service and the tree-structured data service sit behind
//! these traits, so the core never depends on a concrete backend.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::domain::Identity;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The tree-structured data service.
///
/// Paths are `/`-separated keys such as `chats/{id}/messages`. A snapshot is
/// `None` when nothing is stored at or below the path.
#[async_trait]
pub trait TreeStore: Send + Sync {
    /// Reads the whole value at `path`, including every descendant.
    async fn get(&self, path: &str) -> PortResult<Option<Value>>;

    /// Appends `value` under `path` with a freshly generated key and returns the key.
    /// Generated keys sort lexically in insertion order.
    async fn push(&self, path: &str, value: Value) -> PortResult<String>;

    /// Merge-patches the object stored at `path` with `fields`.
    /// Fails with `PortError::NotFound` when no node exists at `path`.
    async fn update(&self, path: &str, fields: Map<String, Value>) -> PortResult<()>;
}

/// The hosted identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves the identity behind a session credential, or `None` when the
    /// credential is unknown or the session is gone.
    async fn current_identity(&self, credential: &str) -> PortResult<Option<Identity>>;

    /// Ends the session behind `credential`. Signing out twice is not an error.
    async fn sign_out(&self, credential: &str) -> PortResult<()>;
}

//=========================================================================================
// Client Context
//=========================================================================================

/// Handles to the external collaborators, built once at start-up and passed by
/// reference to every component constructor.
#[derive(Clone)]
pub struct ClientContext {
    pub store: Arc<dyn TreeStore>,
    pub auth: Arc<dyn IdentityProvider>,
}

impl ClientContext {
    pub fn new(store: Arc<dyn TreeStore>, auth: Arc<dyn IdentityProvider>) -> Self {
        Self { store, auth }
    }
}
