//! Company use-case service.
//!
//! # Invariants
//! - Updates are partial and dirty-checked: resubmitting identical (trimmed)
//!   data returns `false` and performs no write.
//! - Deleting a company detaches its employees instead of deleting them.

use crate::model::company::{Company, CompanyId};
use crate::model::employee::Employee;
use crate::model::input::{CompanyInput, EmployeeInput};
use crate::model::validation::validate_company_patch;
use crate::repo::company_repo::CompanyRepository;
use crate::repo::employee_repo::EmployeeRepository;
use crate::service::write_coordinator::{CompanyWithEmployees, WriteCoordinator};
use crate::service::ServiceResult;
use crate::tracking::EntityKey;
use log::info;
use rusqlite::Connection;

/// Company use-case facade over one request-scoped coordinator.
pub struct CompanyService<'conn> {
    coordinator: WriteCoordinator<'conn>,
}

impl<'conn> CompanyService<'conn> {
    pub fn new(coordinator: WriteCoordinator<'conn>) -> Self {
        Self { coordinator }
    }

    /// Builds a service over a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> ServiceResult<Self> {
        Ok(Self::new(WriteCoordinator::try_new(conn)?))
    }

    pub fn coordinator(&mut self) -> &mut WriteCoordinator<'conn> {
        &mut self.coordinator
    }

    /// Creates a company with optional employees as one atomic unit.
    pub fn create_company(
        &mut self,
        input: &CompanyInput,
        employees: &[EmployeeInput],
    ) -> ServiceResult<CompanyWithEmployees> {
        self.coordinator.create_with_dependents(input, employees)
    }

    /// Applies the fields present in `input` to company `id`.
    ///
    /// Returns whether anything was written.
    pub fn update_company(&mut self, id: CompanyId, input: &CompanyInput) -> ServiceResult<bool> {
        let patch = validate_company_patch(input)?;
        let mut company = self.coordinator.load_company(id)?;
        company.apply_patch(&patch);

        let changed = self.coordinator.flush_company(&mut company)?;
        info!(
            "event=company_update module=service status=ok company_id={} changed={}",
            id, changed
        );
        Ok(changed)
    }

    pub fn get_company(&mut self, id: CompanyId) -> ServiceResult<Company> {
        self.coordinator.load_company(id)
    }

    pub fn list_companies(&mut self) -> ServiceResult<Vec<Company>> {
        Ok(self.coordinator.companies().list()?)
    }

    /// Employees currently referencing company `id`.
    pub fn list_company_employees(&mut self, id: CompanyId) -> ServiceResult<Vec<Employee>> {
        self.coordinator.load_company(id)?;
        Ok(self.coordinator.employees().list_by_company(id)?)
    }

    /// Deletes company `id` and returns how many employees were detached.
    pub fn delete_company(&mut self, id: CompanyId) -> ServiceResult<usize> {
        let detached = self.coordinator.run_in_transaction(|scope| {
            let employees = scope.employees().list_by_company(id)?;
            scope.companies().delete(id)?;

            scope.stage_forget(EntityKey::company(id));
            for mut employee in employees.iter().cloned() {
                employee.assign_company(None);
                scope.stage_snapshot(&employee);
            }
            Ok(employees.len())
        })?;

        info!(
            "event=company_delete module=service status=ok company_id={} detached_employees={}",
            id, detached
        );
        Ok(detached)
    }
}
