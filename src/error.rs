//! Error taxonomy shared by every domain module.
//!
//! Domain engines return `ServiceError`; the web layer converts it to a
//! JSON response through `ResponseError`. Storage-detected constraint
//! violations are translated at the mutation boundary and never leak as
//! raw database errors.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing, malformed, or expired credential, or a subject that no
    /// longer resolves to a user.
    #[error("authentication required")]
    Unauthenticated,
    /// Authenticated but not permitted.
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    /// Accepted by transport validation but semantically invalid for the
    /// operation.
    #[error("{0}")]
    InvalidRequest(String),
    /// Would violate a uniqueness or referential constraint.
    #[error("{0}")]
    Conflict(String),
    /// Unexpected storage or logic failure. The message is logged, never
    /// returned to the caller.
    #[error("internal server error")]
    Internal(String),
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        ServiceError::Internal(format!("database error: {err}"))
    }
}

/// Translates a storage error raised by an insert or update into the
/// caller-facing taxonomy. A unique violation becomes `Conflict`; an FK
/// violation means a referenced row vanished and becomes `NotFound`.
pub fn constraint_error(err: DbErr, conflict: &str, missing: &str) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::Conflict(conflict.to_owned()),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => ServiceError::NotFound(missing.to_owned()),
        _ => err.into(),
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::Unauthenticated => HttpResponse::Unauthorized()
                .insert_header(("WWW-Authenticate", "Bearer"))
                .json(serde_json::json!({ "error": self.to_string() })),
            ServiceError::Internal(detail) => {
                log::error!("{}", detail);
                HttpResponse::InternalServerError()
                    .json(serde_json::json!({ "error": self.to_string() }))
            }
            _ => HttpResponse::build(self.status_code())
                .json(serde_json::json!({ "error": self.to_string() })),
        }
    }
}
