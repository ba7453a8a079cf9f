//! Error types for the HTTP API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! error body has the shape `{"error": "...", "status": 404}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pilot_ledger_core::StoreError;
use pilot_ledger_core::import::ImportError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or unrecognized bearer credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is authenticated but may not touch this resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The requested resource was not found (or is not visible).
    #[error("not found: {0}")]
    NotFound(String),

    /// The request collides with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A payload failed boundary validation.
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// A character log export could not be parsed.
    #[error("failed to parse CSV: {0}")]
    Import(#[from] ImportError),

    /// The store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Shorthand for a missing entity of the given kind.
    pub fn not_found(kind: &str) -> Self {
        Self::NotFound(format!("{kind} not found"))
    }

    /// The HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) | Self::Validation(_) | Self::Import(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::BadRequest(msg) => msg.clone(),
            Self::Validation(_) | Self::Import(_) => self.to_string(),
            Self::Store(e) => {
                tracing::error!(error = %e, "Store failure while serving request");
                String::from("internal error")
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(ApiError::Unauthorized(String::new()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden(String::new()).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("Pilot").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict(String::new()).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Import(ImportError::MissingPilotRow).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Store(StoreError::Corrupt {
                table: "pilots",
                message: String::new(),
            })
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message() {
        assert_eq!(ApiError::not_found("Clock").to_string(), "not found: Clock not found");
    }
}
