//! Mapping of core errors onto HTTP responses.
//!
//! Client-facing bodies keep the shape the browser client expects: a bare JSON string
//! `"Error: ..."` for 400s and `{message, error}` for an interaction conflict.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use api_shared::InteractionRes;
use cdss_core::CdssError;

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Interaction(String),
    #[error("{0}")]
    Persistence(String),
}

impl From<CdssError> for ApiError {
    fn from(err: CdssError) -> Self {
        if err.is_validation() {
            ApiError::Validation(err.to_string())
        } else if err.is_conflict() {
            ApiError::Interaction(err.to_string())
        } else {
            ApiError::Persistence(err.to_string())
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Persistence(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(detail) => {
                (StatusCode::BAD_REQUEST, Json(format!("Error: {}", detail))).into_response()
            }
            ApiError::Interaction(detail) => (
                StatusCode::CONFLICT,
                Json(InteractionRes {
                    message: "Interaction Detected".into(),
                    error: detail,
                }),
            )
                .into_response(),
            ApiError::Persistence(detail) => {
                tracing::error!("persistence error: {}", detail);
                (StatusCode::BAD_REQUEST, Json(format!("Error: {}", detail))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_api_errors() {
        assert!(matches!(
            ApiError::from(CdssError::MissingRequiredFields),
            ApiError::Validation(msg) if msg == "Please provide all required fields."
        ));
        assert!(matches!(
            ApiError::from(CdssError::InteractionDetected("boom".into())),
            ApiError::Interaction(msg) if msg == "boom"
        ));
        assert!(matches!(
            ApiError::from(CdssError::FileRead(std::io::Error::other("disk gone"))),
            ApiError::Persistence(_)
        ));
    }

    #[test]
    fn status_codes() {
        let validation = ApiError::Validation("x".into()).into_response();
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let conflict = ApiError::Interaction("x".into()).into_response();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let persistence = ApiError::Persistence("x".into()).into_response();
        assert_eq!(persistence.status(), StatusCode::BAD_REQUEST);
    }
}
