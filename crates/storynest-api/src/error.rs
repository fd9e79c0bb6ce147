//! Error taxonomy for every service operation, and its mapping onto HTTP
//! responses at the handler boundary.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use storynest_types::api::Flash;

use crate::flash;

/// User-correctable input problem. `reason` is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self { field, reason: reason.into() }
    }
}

/// Login failure. Deliberately says nothing about which half was wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid username or password.")]
    InvalidCredentials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthzError {
    /// `action` is the verb shown to the user ("edit", "delete").
    #[error("You do not have permission to {action} this article.")]
    NotOwner { action: &'static str },
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Authz(#[from] AuthzError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<tower_sessions::session::Error> for ServiceError {
    fn from(e: tower_sessions::session::Error) -> Self {
        ServiceError::Storage(anyhow::Error::new(e).context("session store"))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            ServiceError::Validation(e) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "error": e.reason }))).into_response()
            }
            ServiceError::Auth(e) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": e.to_string() }))).into_response()
            }
            ServiceError::Authz(e) => {
                flash::redirect("/dashboard", Flash::error(e.to_string()))
            }
            ServiceError::NotFound(what) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": format!("{} not found", what) })))
                    .into_response()
            }
            ServiceError::Storage(e) => {
                error!("Storage failure: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
