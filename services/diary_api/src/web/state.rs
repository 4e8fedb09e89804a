//! services/diary_api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::web::views::Views;
use diary_core::ClientContext;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub ctx: ClientContext,
    pub config: Arc<Config>,
    pub views: Arc<Views>,
}
