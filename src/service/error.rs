use thiserror::Error;

use crate::blob::BlobError;
use crate::codegen::CodeGenError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// A foreign key that points at nothing.
    #[error("{0}")]
    InvalidReference(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Property code generation failed: {0}")]
    CodeGen(#[from] CodeGenError),

    #[error("Blob store error: {0}")]
    Blob(#[from] BlobError),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Caller mistakes, as opposed to failures of a collaborator.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidReference(_) | Self::Forbidden(_) | Self::NotFound(_)
        )
    }
}
