//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls, dirty-checking and transaction
//!   boundaries into use-case level APIs.
//! - Map repository failures to the three caller-facing error kinds.
//!
//! # Invariants
//! - Validation and not-found errors are raised before any write.
//! - A failed multi-entity write leaves no partial rows behind.

use crate::model::validation::ValidationErrors;
use crate::repo::RepoError;
use crate::tracking::EntityKey;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod company_service;
pub mod employee_service;
pub mod transaction;
pub mod write_coordinator;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Caller-facing error for every service operation.
#[derive(Debug)]
pub enum ServiceError {
    /// Input failed validation; nothing was written.
    Validation(ValidationErrors),
    /// Lookup by id found no row; nothing was written.
    NotFound(EntityKey),
    /// The store rejected a read or write; any open transaction was rolled back.
    Persistence(RepoError),
}

impl ServiceError {
    /// Short machine-readable code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound(_) => "not_found",
            Self::Persistence(RepoError::ConstraintViolation(_)) => "constraint_violation",
            Self::Persistence(_) => "persistence_failed",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "{errors}"),
            Self::NotFound(key) => write!(f, "{} with id {} not found", key.kind, key.id),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::NotFound(_) => None,
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(key) => Self::NotFound(key),
            other => Self::Persistence(other),
        }
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Persistence(RepoError::from(value))
    }
}
