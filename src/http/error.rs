use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::app::RelationError;

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Maps a follow/like failure, logging backend errors under `context`.
    pub fn from_relation(err: RelationError, context: &'static str) -> Self {
        match err {
            RelationError::InvalidTarget => Self::bad_request(err.to_string()),
            RelationError::TargetNotFound
            | RelationError::PostNotFound
            | RelationError::LikeNotFound => Self::not_found(err.to_string()),
            RelationError::Store(store_err) => {
                tracing::error!(error = ?store_err, "{}", context);
                Self::internal(context)
            }
        }
    }
}

// Extractor rejections keep axum's status and text, rendered as `detail`.
macro_rules! rejection_into_app_error {
    ($($rejection:ty),* $(,)?) => {
        $(
            impl From<$rejection> for AppError {
                fn from(rejection: $rejection) -> Self {
                    Self {
                        status: rejection.status(),
                        message: rejection.body_text(),
                    }
                }
            }
        )*
    };
}

rejection_into_app_error!(PathRejection, QueryRejection, JsonRejection, FormRejection);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            detail: self.message,
        });
        (self.status, body).into_response()
    }
}
