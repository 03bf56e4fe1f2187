//! Error types for the mutation layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::validation::FieldErrors;

pub type ActionResult<T> = Result<T, ActionError>;

/// Why a mutation was not applied.
///
/// Every variant aborts only the current mutation. The display string is the
/// message shown to the caller.
#[derive(Error, Debug)]
pub enum ActionError {
    /// Submitted fields failed validation.
    #[error("{message}")]
    Validation { errors: FieldErrors, message: String },

    /// The write would overload the master.
    #[error("{0}")]
    Capacity(String),

    #[error("{0}")]
    NotFound(String),

    /// The write conflicts with existing rows.
    #[error("{0}")]
    Conflict(String),

    /// The store failed. `cause` is logged, never shown.
    #[error("Database Error: Failed to {operation}.")]
    Database {
        operation: &'static str,
        cause: anyhow::Error,
    },
}

impl ActionError {
    pub fn validation(errors: FieldErrors, operation: &str) -> Self {
        Self::Validation {
            errors,
            message: format!("Missing Fields. Failed to {}.", operation),
        }
    }

    pub fn database(operation: &'static str, cause: anyhow::Error) -> Self {
        Self::Database { operation, cause }
    }

    /// Field errors, when this is a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::Capacity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body returned for a failed mutation.
#[derive(Debug, Serialize)]
pub struct ActionErrorBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<&'a FieldErrors>,
    pub message: String,
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        match &self {
            Self::Database { operation, cause } => {
                tracing::error!("Database error while trying to {}: {:#}", operation, cause);
            }
            other => {
                tracing::warn!("Mutation rejected: {}", other);
            }
        }

        let body = ActionErrorBody {
            errors: self.field_errors(),
            message: self.to_string(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}
