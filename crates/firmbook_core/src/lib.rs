//! Core domain logic for firmbook: companies, their employees, snapshot
//! dirty-checking and transactional multi-entity writes.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod tracking;

pub use config::FirmbookConfig;
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::company::{Company, CompanyDraft, CompanyId, CompanyPatch};
pub use model::employee::{Employee, EmployeeDraft, EmployeeId, EmployeePatch};
pub use model::input::{CompanyInput, EmployeeInput};
pub use model::validation::{FieldError, ValidationErrors};
pub use repo::company_repo::{CompanyRepository, SqliteCompanyRepository};
pub use repo::employee_repo::{EmployeeRepository, SqliteEmployeeRepository};
pub use repo::{RepoError, RepoResult};
pub use service::company_service::CompanyService;
pub use service::employee_service::EmployeeService;
pub use service::transaction::TransactionScope;
pub use service::write_coordinator::{CompanyWithEmployees, WriteCoordinator};
pub use service::{ServiceError, ServiceResult};
pub use tracking::{ChangeSet, ChangeTracker, EntityKey, EntityKind, FieldValue, Tracked};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
