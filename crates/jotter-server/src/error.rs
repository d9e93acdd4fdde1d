//! HTTP error responses
//!
//! Every failed request gets a JSON body of the form `{"message": "..."}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use jotter_core::{ExportError, NoteError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Note(#[from] NoteError),

    #[error(transparent)]
    Export(#[from] ExportError),

    /// No usable owner id on the request
    #[error("Not authorized, no owner")]
    MissingOwner,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Note(NoteError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Note(NoteError::Unauthorized) | ApiError::MissingOwner => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Note(NoteError::Validation(_)) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Note(NoteError::Store(_)) | ApiError::Export(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the caller; server-side details stay in the log
    fn public_message(&self) -> String {
        match self {
            ApiError::Note(NoteError::NotFound(_)) => "Note not found".to_string(),
            ApiError::Note(NoteError::Unauthorized) => "Not authorized".to_string(),
            ApiError::Note(NoteError::Validation(message)) | ApiError::BadRequest(message) => {
                message.clone()
            }
            ApiError::MissingOwner => self.to_string(),
            ApiError::Note(NoteError::Store(_)) | ApiError::Export(_) | ApiError::Internal(_) => {
                "Server error".to_string()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(ErrorResponse {
            message: self.public_message(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(NoteError::not_found("x")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(NoteError::Unauthorized).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::MissingOwner.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(NoteError::validation("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ExportError::Pdf("boom".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let error = ApiError::Internal("lock poisoned".to_string());
        assert_eq!(error.public_message(), "Server error");
        assert_eq!(
            ApiError::from(NoteError::not_found("abc")).public_message(),
            "Note not found"
        );
    }
}
