//! Employee use-case service.
//!
//! # Invariants
//! - Updates are partial and dirty-checked.
//! - A referenced company must exist before an employee points at it.

use crate::model::company::CompanyId;
use crate::model::employee::{Employee, EmployeeId};
use crate::model::input::EmployeeInput;
use crate::model::validation::{validate_employee_patch, validate_new_employee};
use crate::repo::company_repo::CompanyRepository;
use crate::repo::employee_repo::EmployeeRepository;
use crate::service::write_coordinator::WriteCoordinator;
use crate::service::{ServiceError, ServiceResult};
use crate::tracking::EntityKey;
use log::info;
use rusqlite::Connection;

/// Employee use-case facade over one request-scoped coordinator.
pub struct EmployeeService<'conn> {
    coordinator: WriteCoordinator<'conn>,
}

impl<'conn> EmployeeService<'conn> {
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

    /// Creates one employee, optionally attached to an existing company.
    pub fn create_employee(
        &mut self,
        input: &EmployeeInput,
        company_id: Option<CompanyId>,
    ) -> ServiceResult<Employee> {
        let draft = validate_new_employee(input)?;

        let employee = self.coordinator.run_in_transaction(|scope| {
            if let Some(company_id) = company_id {
                if !scope.companies().exists(company_id)? {
                    return Err(ServiceError::NotFound(EntityKey::company(company_id)));
                }
            }

            let mut employee = Employee::new(draft);
            employee.assign_company(company_id);
            scope.employees().save(&mut employee)?;
            scope.stage_snapshot(&employee);
            Ok(employee)
        })?;

        info!(
            "event=employee_create module=service status=ok employee_id={} has_company={}",
            employee.id().unwrap_or_default(),
            company_id.is_some()
        );
        Ok(employee)
    }

    /// Creates a batch of employees for existing company `company_id`.
    pub fn add_employees_to_company(
        &mut self,
        company_id: CompanyId,
        inputs: &[EmployeeInput],
    ) -> ServiceResult<Vec<Employee>> {
        self.coordinator.add_dependents(company_id, inputs)
    }

    /// Applies the fields present in `input` to employee `id`.
    ///
    /// Returns whether anything was written.
    pub fn update_employee(&mut self, id: EmployeeId, input: &EmployeeInput) -> ServiceResult<bool> {
        let patch = validate_employee_patch(input)?;
        let mut employee = self.coordinator.load_employee(id)?;
        employee.apply_patch(&patch);

        let changed = self.coordinator.flush_employee(&mut employee)?;
        info!(
            "event=employee_update module=service status=ok employee_id={} changed={}",
            id, changed
        );
        Ok(changed)
    }

    /// Reassigns employee `id` to company `company_id`.
    pub fn assign_company(&mut self, id: EmployeeId, company_id: CompanyId) -> ServiceResult<bool> {
        self.coordinator.update_employee_company(id, company_id)
    }

    pub fn get_employee(&mut self, id: EmployeeId) -> ServiceResult<Employee> {
        self.coordinator.load_employee(id)
    }

    pub fn list_employees(&mut self) -> ServiceResult<Vec<Employee>> {
        Ok(self.coordinator.employees().list()?)
    }

    pub fn delete_employee(&mut self, id: EmployeeId) -> ServiceResult<()> {
        self.coordinator.run_in_transaction(|scope| {
            scope.employees().delete(id)?;
            scope.stage_forget(EntityKey::employee(id));
            Ok(())
        })?;

        info!(
            "event=employee_delete module=service status=ok employee_id={}",
            id
        );
        Ok(())
    }
}
