//! API error type.
//!
//! Handlers return `Result<_, AppError>` and use `?` on diesel, pool,
//! validation and workflow failures. Every variant maps to one status code and
//! one `ApiError` body; internal failures are logged here and their details
//! never reach the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use shared::{ApiError, ValidationError, WorkflowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error("Database connection failed: {0}")]
    Pool(String),
    /// A stored row holds a value the API cannot represent.
    #[error("Stored record is invalid: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Database(#[from] DieselError),
}

impl AppError {
    pub fn not_found(what: &str, id: i32) -> Self {
        AppError::NotFound(format!("{} {} not found", what, id))
    }

    fn status_and_body(&self) -> (StatusCode, ApiError) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::not_found(msg.clone())),
            AppError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                ApiError::validation_error(err.to_string()),
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ApiError::validation_error(msg.clone()),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, ApiError::forbidden(msg.clone())),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ApiError::conflict(msg.clone())),
            AppError::Workflow(err) => (
                StatusCode::CONFLICT,
                ApiError::workflow_error(err.to_string()),
            ),
            AppError::Database(DieselError::NotFound) => (
                StatusCode::NOT_FOUND,
                ApiError::not_found("Record not found"),
            ),
            AppError::Database(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => (
                StatusCode::CONFLICT,
                ApiError::conflict("A record with the same unique value already exists"),
            ),
            AppError::Database(DieselError::DatabaseError(
                DatabaseErrorKind::ForeignKeyViolation,
                _,
            )) => (
                StatusCode::BAD_REQUEST,
                ApiError::validation_error("Referenced record does not exist"),
            ),
            AppError::Pool(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal_error("Database connection failed"),
            ),
            AppError::Corrupt(_) | AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal_error("Internal server error"),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        if status.is_server_error() {
            tracing::error!("{self}");
        } else {
            tracing::debug!(status = %status, "{self}");
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn maps_client_errors() {
        assert_eq!(
            status_of(AppError::not_found("Vendor", 3)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ValidationError::new("phone", "bad").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(WorkflowError::AlreadyComplete.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Forbidden("no".into())),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn maps_diesel_errors() {
        assert_eq!(
            status_of(DieselError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DieselError::RollbackTransaction.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::Pool("timeout".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn workflow_body_uses_workflow_code() {
        let (_, body) = AppError::from(WorkflowError::UnknownStep(20)).status_and_body();
        assert_eq!(body.error.code, "WORKFLOW_ERROR");
        assert!(body.error.message.contains("20"));
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let (_, body) = AppError::Corrupt("status 'xyz'".into()).status_and_body();
        assert_eq!(body.error.message, "Internal server error");
    }
}
