use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Wire shape for every error response: `{"errors": ["..."]}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub errors: Vec<String>,
}

/// A domain rule violated before a row is written. The message names the
/// rule that actually failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Username already exists")]
    UsernameTaken,
    #[error("Username expected")]
    UsernameMissing,
    #[error("Title must be present")]
    TitleMissing,
    #[error("Instruction should be 50 characters or more")]
    InstructionsTooShort,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Unauthorized(String),
    #[error("Bad Request")]
    BadRequest,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::BadRequest => (StatusCode::UNPROCESSABLE_ENTITY, "Bad Request".into()),
            ApiError::Internal(e) => {
                error!(error = %e, "unexpected failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };
        (
            status,
            Json(ErrorBody {
                errors: vec![message],
            }),
        )
            .into_response()
    }
}
