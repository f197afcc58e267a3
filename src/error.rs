//! Error type returned by every handler, with its HTTP mapping.
//!
//! Bodies always carry a `detail` key: a list of field errors for
//! validation failures, a message string otherwise. Storage faults are logged
//! and answered with a generic message.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use log::error;
use serde_json::json;
use thiserror::Error;

use crate::db::DbError;
use crate::models::{InvalidPriority, PageError, ValidationErrors};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{resource} with ID {id} not found")]
    NotFound { resource: &'static str, id: i64 },

    #[error("{0}")]
    InvalidParameter(String),

    #[error("storage error: {0}")]
    Storage(DbError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { resource, id } => ApiError::NotFound { resource, id },
            other => ApiError::Storage(other),
        }
    }
}

impl From<PageError> for ApiError {
    fn from(err: PageError) -> Self {
        ApiError::InvalidParameter(err.to_string())
    }
}

impl From<InvalidPriority> for ApiError {
    fn from(err: InvalidPriority) -> Self {
        ApiError::InvalidParameter(err.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Validation(errors) => json!({ "detail": errors }),
            ApiError::Storage(e) => {
                error!("storage error: {}", e);
                json!({ "detail": "internal storage error" })
            }
            ApiError::Internal(msg) => {
                error!("internal error: {}", msg);
                json!({ "detail": "internal server error" })
            }
            other => json!({ "detail": other.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(ValidationErrors::single("body", err.to_string())).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(ValidationErrors::single("query", err.to_string())).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(ValidationErrors::single("path", err.to_string())).into()
}
