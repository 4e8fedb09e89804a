//! services/diary_api/src/error.rs
//!
//! Defines the primary error type for the API service, and the notice shape
//! user-facing failures are reported in.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diary_core::{DeskError, PortError};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// The primary error type for the `diary_api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Body of every user-facing failure. A blocking notice must be acknowledged
/// by the user; the page cannot continue past it.
#[derive(Debug, Serialize, ToSchema)]
pub struct NoticeBody {
    pub notice: String,
    pub blocking: bool,
}

/// A failure reported to the user at the point it happened.
#[derive(Debug)]
pub struct Notice {
    pub status: StatusCode,
    pub body: NoticeBody,
}

impl Notice {
    fn new(status: StatusCode, notice: impl Into<String>, blocking: bool) -> Self {
        Self {
            status,
            body: NoticeBody {
                notice: notice.into(),
                blocking,
            },
        }
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong. Please try again.", false)
    }
}

impl From<DeskError> for Notice {
    fn from(e: DeskError) -> Self {
        match e {
            DeskError::NotAssigned(_) => Notice::new(
                StatusCode::CONFLICT,
                "No teacher has been assigned to you yet.",
                true,
            ),
            DeskError::NotFound { .. } => Notice::new(
                StatusCode::NOT_FOUND,
                "That diary entry could not be found. The advice was not saved.",
                true,
            ),
            DeskError::Address(e) => {
                error!("Cannot address conversation: {}", e);
                Notice::new(StatusCode::UNPROCESSABLE_ENTITY, "This account cannot be used for a diary.", true)
            }
            other => {
                error!("Request failed: {:?}", other);
                Notice::internal()
            }
        }
    }
}

impl From<PortError> for Notice {
    fn from(e: PortError) -> Self {
        DeskError::from(e).into()
    }
}

impl IntoResponse for Notice {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
