use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

/// Reasons a new redirect can be refused. The display text is what the
/// requester sees, so keep it short and free of internal detail.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CreationError {
    #[error("Missing parameters")]
    MissingParameters,

    #[error("Key already taken.")]
    KeyTaken,

    #[error("Not a valid URL.")]
    InvalidUrl,

    #[error("Hit limit of {limit} shortens per hour.")]
    RateLimitExceeded { limit: u32 },

    #[error("Failed to save redirect.")]
    StorageFailure,
}

impl ResponseError for CreationError {
    fn status_code(&self) -> StatusCode {
        match self {
            CreationError::MissingParameters | CreationError::InvalidUrl => StatusCode::BAD_REQUEST,
            CreationError::KeyTaken => StatusCode::CONFLICT,
            CreationError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            CreationError::StorageFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}
