//! Transactional write coordination with dirty-checked flushes.
//!
//! # Responsibility
//! - Own the request-scoped persistence context: one connection plus one
//!   `ChangeTracker`.
//! - Load entities with snapshot capture, flush them only when dirty.
//! - Create a company together with its employees as one atomic unit.
//!
//! # Invariants
//! - Parent input is validated before the transaction opens.
//! - Each dependent is validated right before it is staged, inside the same
//!   transaction, so a late failure also discards the parent insert.
//! - Lookups that fail with `NotFound` happen before any mutation.

use crate::model::company::{Company, CompanyId};
use crate::model::employee::{Employee, EmployeeId};
use crate::model::input::{CompanyInput, EmployeeInput};
use crate::model::validation::{validate_new_company, validate_new_employee};
use crate::repo::company_repo::{CompanyRepository, SqliteCompanyRepository};
use crate::repo::employee_repo::{EmployeeRepository, SqliteEmployeeRepository};
use crate::repo::ensure_connection_ready;
use crate::service::transaction::{run_in_transaction, TransactionScope};
use crate::service::{ServiceError, ServiceResult};
use crate::tracking::{ChangeSet, ChangeTracker, EntityKey, Tracked};
use log::{debug, info};
use rusqlite::Connection;

/// A company and the employees created with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyWithEmployees {
    pub company: Company,
    pub employees: Vec<Employee>,
}

/// Request-scoped persistence context.
pub struct WriteCoordinator<'conn> {
    conn: &'conn mut Connection,
    tracker: ChangeTracker,
}

impl<'conn> WriteCoordinator<'conn> {
    /// Builds a coordinator over a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> ServiceResult<Self> {
        ensure_connection_ready(&*conn)?;
        Ok(Self {
            conn,
            tracker: ChangeTracker::new(),
        })
    }

    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    pub fn companies(&self) -> SqliteCompanyRepository<'_> {
        SqliteCompanyRepository::new(&*self.conn)
    }

    pub fn employees(&self) -> SqliteEmployeeRepository<'_> {
        SqliteEmployeeRepository::new(&*self.conn)
    }

    /// Returns whether `entity` differs from its last persisted snapshot,
    /// registering it with the tracker when needed.
    pub fn is_dirty<E: Tracked>(&mut self, entity: &E) -> bool {
        self.tracker.is_dirty(entity)
    }

    pub fn change_set<E: Tracked>(&mut self, entity: &E) -> ChangeSet {
        self.tracker.change_set(entity)
    }

    /// Runs `work` as one atomic unit; see [`run_in_transaction`].
    pub fn run_in_transaction<T, F>(&mut self, work: F) -> ServiceResult<T>
    where
        F: FnOnce(&mut TransactionScope<'_>) -> ServiceResult<T>,
    {
        run_in_transaction(self.conn, &mut self.tracker, work)
    }

    /// Loads a company and captures its snapshot.
    pub fn load_company(&mut self, id: CompanyId) -> ServiceResult<Company> {
        let company = self
            .companies()
            .find_by_id(id)?
            .ok_or(ServiceError::NotFound(EntityKey::company(id)))?;
        self.tracker.capture(&company);
        Ok(company)
    }

    /// Loads an employee and captures its snapshot.
    pub fn load_employee(&mut self, id: EmployeeId) -> ServiceResult<Employee> {
        let employee = self
            .employees()
            .find_by_id(id)?
            .ok_or(ServiceError::NotFound(EntityKey::employee(id)))?;
        self.tracker.capture(&employee);
        Ok(employee)
    }

    /// Writes `company` when dirty and recaptures its snapshot.
    ///
    /// Returns `false` without touching storage when nothing changed.
    pub fn flush_company(&mut self, company: &mut Company) -> ServiceResult<bool> {
        let changes = self.tracker.change_set(&*company);
        if changes.is_empty() {
            return Ok(false);
        }
        self.companies().save(company)?;
        self.tracker.capture(&*company);
        debug!(
            "event=entity_flush module=service status=ok kind=company id={} fields={}",
            company.id().unwrap_or_default(),
            changes.fields().join(",")
        );
        Ok(true)
    }

    /// Writes `employee` when dirty and recaptures its snapshot.
    pub fn flush_employee(&mut self, employee: &mut Employee) -> ServiceResult<bool> {
        let changes = self.tracker.change_set(&*employee);
        if changes.is_empty() {
            return Ok(false);
        }
        self.employees().save(employee)?;
        self.tracker.capture(&*employee);
        debug!(
            "event=entity_flush module=service status=ok kind=employee id={} fields={}",
            employee.id().unwrap_or_default(),
            changes.fields().join(",")
        );
        Ok(true)
    }

    /// Creates a company and all of its employees, or nothing at all.
    ///
    /// # Errors
    /// - `Validation` for the company before any write, or for the first
    ///   invalid employee (field names prefixed `employees[i]`), after which
    ///   the company insert is rolled back.
    /// - `Persistence` when the store rejects any insert, e.g. a duplicate
    ///   email; the whole unit is rolled back.
    pub fn create_with_dependents(
        &mut self,
        parent: &CompanyInput,
        dependents: &[EmployeeInput],
    ) -> ServiceResult<CompanyWithEmployees> {
        let draft = validate_new_company(parent)?;

        let created = self.run_in_transaction(|scope| {
            let mut company = Company::new(draft);
            let company_id = scope.companies().save(&mut company)?;

            let mut employees = build_dependents(company_id, dependents)?;
            flush_staged_employees(scope, &mut employees)?;
            scope.stage_snapshot(&company);
            Ok(CompanyWithEmployees { company, employees })
        })?;

        info!(
            "event=company_create module=service status=ok company_id={} employee_count={}",
            created.company.id().unwrap_or_default(),
            created.employees.len()
        );
        Ok(created)
    }

    /// Creates employees for an existing company in one transaction.
    pub fn add_dependents(
        &mut self,
        company_id: CompanyId,
        dependents: &[EmployeeInput],
    ) -> ServiceResult<Vec<Employee>> {
        let employees = self.run_in_transaction(|scope| {
            if !scope.companies().exists(company_id)? {
                return Err(ServiceError::NotFound(EntityKey::company(company_id)));
            }

            let mut employees = build_dependents(company_id, dependents)?;
            flush_staged_employees(scope, &mut employees)?;
            Ok(employees)
        })?;

        info!(
            "event=employees_add module=service status=ok company_id={} employee_count={}",
            company_id,
            employees.len()
        );
        Ok(employees)
    }

    /// Points an employee at another company, writing only when the
    /// reference actually changes.
    ///
    /// Both ids are resolved before the employee is touched, so a missing
    /// company leaves the stored reference as it was.
    pub fn update_employee_company(
        &mut self,
        employee_id: EmployeeId,
        company_id: CompanyId,
    ) -> ServiceResult<bool> {
        let mut employee = self.load_employee(employee_id)?;
        let company = self.load_company(company_id)?;

        employee.assign_company(company.id());
        let changed = self.flush_employee(&mut employee)?;
        info!(
            "event=employee_assign_company module=service status=ok employee_id={} company_id={} changed={}",
            employee_id, company_id, changed
        );
        Ok(changed)
    }
}

// Validates and links each dependent in order, stopping at the first
// invalid one.
fn build_dependents(
    company_id: CompanyId,
    dependents: &[EmployeeInput],
) -> ServiceResult<Vec<Employee>> {
    let mut employees = Vec::with_capacity(dependents.len());
    for (index, input) in dependents.iter().enumerate() {
        let draft = validate_new_employee(input)
            .map_err(|errors| errors.with_prefix(&format!("employees[{index}]")))?;
        let mut employee = Employee::new(draft);
        employee.assign_company(Some(company_id));
        employees.push(employee);
    }
    Ok(employees)
}

// Inserts every staged employee in one pass and schedules their snapshots.
fn flush_staged_employees(
    scope: &mut TransactionScope<'_>,
    employees: &mut [Employee],
) -> ServiceResult<()> {
    {
        let repo = scope.employees();
        for employee in employees.iter_mut() {
            repo.save(employee)?;
        }
    }
    for employee in employees.iter() {
        scope.stage_snapshot(employee);
    }
    Ok(())
}
