use thiserror::Error;

use crate::records::domain::Kind;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(Kind),
    #[error("{kind} with email {email} already exists")]
    DuplicateEmail { kind: Kind, email: String },
    #[error("storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    pub fn not_found(kind: Kind) -> Self { Self::NotFound(kind) }

    pub fn duplicate_email(kind: Kind, email: impl Into<String>) -> Self {
        Self::DuplicateEmail { kind, email: email.into() }
    }

    pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }

    /// Short label for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Validation(_) => "invalid",
            Self::NotFound(_) => "not_found",
            Self::DuplicateEmail { .. } => "duplicate",
            Self::Storage(_) => "storage_error",
        }
    }
}

impl From<models::errors::ModelError> for ServiceError {
    fn from(e: models::errors::ModelError) -> Self { Self::Storage(e.to_string()) }
}
