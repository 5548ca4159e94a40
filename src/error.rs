use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{identity::IdentityError, repository::RepoError};

/// ApiError
///
/// Every failure a handler can surface. Each variant maps to one status code and a
/// user-facing message rendered as `{ "error": "..." }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("authentication required")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The hosted auth service rejected the request (bad credentials, duplicate email...).
    #[error("{0}")]
    AuthRejected(String),

    #[error("authentication service unavailable")]
    Upstream(String),

    #[error("internal server error")]
    Internal(String),
}

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::AuthRejected(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            // Details stay in the logs, the client gets the generic message.
            ApiError::Internal(detail) => tracing::error!("internal error: {}", detail),
            ApiError::Upstream(detail) => tracing::error!("auth provider error: {}", detail),
            _ => tracing::debug!("request rejected: {}", self),
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Conflict => ApiError::Conflict("record already exists".to_string()),
            RepoError::NotFound => ApiError::NotFound("record not found".to_string()),
            RepoError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidCredentials => {
                ApiError::AuthRejected("invalid email or password".to_string())
            }
            IdentityError::Rejected(msg) => ApiError::AuthRejected(msg),
            IdentityError::Transport(msg) => ApiError::Upstream(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_conflict_becomes_409() {
        let err: ApiError = RepoError::Conflict.into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let err = ApiError::Internal("connection reset by peer".to_string());
        assert_eq!(err.to_string(), "internal server error");
    }

    #[test]
    fn bad_credentials_map_to_client_error() {
        let err: ApiError = IdentityError::InvalidCredentials.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "invalid email or password");
    }
}
