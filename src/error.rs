//! Error types for the seams where callers need to tell failures apart.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Maintenance-time content failures. Unlike request-time reads, these
/// carry the file path and stop the tool.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected shape in {path}: {message}")]
    Shape { path: PathBuf, message: String },
}

impl ContentError {
    /// Process exit code used by the maintenance CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            ContentError::Parse { .. } | ContentError::Shape { .. } => 2,
            ContentError::Read { .. } | ContentError::Write { .. } => 1,
        }
    }
}

/// Violations of the one-to-one localized path tables.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathMapError {
    #[error("locale {locale}: \"{first}\" and \"{second}\" both localize to \"{localized}\"")]
    Collision {
        locale: String,
        first: String,
        second: String,
        localized: String,
    },

    #[error("locale {locale}: \"{base}\" localizes to \"{localized}\" which maps back to \"{roundtrip}\"")]
    NotInverse {
        locale: String,
        base: String,
        localized: String,
        roundtrip: String,
    },

    #[error("locale {locale}: \"{path}\" is not an absolute path without trailing slash")]
    Malformed { locale: String, path: String },
}

/// JSON error answered by the `/api` routes as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("Method not allowed. Use POST.")]
    MethodNotAllowed,

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
