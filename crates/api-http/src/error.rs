//! HTTP Error Mapping
//!
//! Maps application errors to status codes and a JSON `{"error": ...}` body.
//! Internal failures are logged here and answered with a generic message.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;
use walkin_core::{AppError, ErrorKind};

const INTERNAL_MESSAGE: &str = "Internal server error";

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Error returned by every handler
#[derive(Debug)]
pub struct ApiError(AppError);

impl ApiError {
    pub fn missing(field: &str) -> Self {
        Self(AppError::Validation(format!("{} is required", field)))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::Validation | ErrorKind::InvalidOperation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing text: the bare message, without the variant prefix
    fn client_message(&self) -> String {
        match &self.0 {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Forbidden(msg) => msg.clone(),
            AppError::Domain(e) => e.to_string(),
            _ => INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::invalid(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "Request failed");
            INTERNAL_MESSAGE.to_string()
        } else {
            self.client_message()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use walkin_core::domain::DomainError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                AppError::Domain(DomainError::NoPendingRating("c-1".into())),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (AppError::Conflict("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                AppError::Domain(DomainError::AlreadyAtEnd("e-1".into())),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_internal_details_are_not_echoed() {
        let err = ApiError::from(AppError::Database("disk I/O error at page 7".into()));
        assert_eq!(err.client_message(), INTERNAL_MESSAGE);

        let err = ApiError::missing("shopId");
        assert_eq!(err.client_message(), "shopId is required");
    }
}
