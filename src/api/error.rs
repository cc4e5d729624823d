use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use super::cors_headers;
use crate::blob::BlobError;
use crate::codegen::CodeGenError;
use crate::service::ServiceError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Blob(#[from] BlobError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Service(e) => service_status(e),
            Self::Blob(e) => blob_status(e),
        }
    }
}

fn service_status(e: &ServiceError) -> StatusCode {
    match e {
        ServiceError::Validation(_) | ServiceError::InvalidReference(_) => StatusCode::BAD_REQUEST,
        ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Store(StoreError::Missing(_)) => StatusCode::NOT_FOUND,
        ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ServiceError::CodeGen(CodeGenError::EmptyType) => StatusCode::BAD_REQUEST,
        ServiceError::CodeGen(_) => StatusCode::SERVICE_UNAVAILABLE,
        ServiceError::Blob(e) => blob_status(e),
    }
}

fn blob_status(e: &BlobError) -> StatusCode {
    match e {
        BlobError::InvalidPath(_) => StatusCode::BAD_REQUEST,
        BlobError::NotFound(_) => StatusCode::NOT_FOUND,
        BlobError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        }
        (
            status,
            cors_headers(),
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
