//! Employee repository contract and SQLite implementation.
//!
//! # Invariants
//! - `save` inserts when the employee has no id and assigns the generated
//!   id; otherwise it updates the existing row or fails with `NotFound`.
//! - `phone_number` is never NULL in storage.

use crate::model::company::CompanyId;
use crate::model::employee::{Employee, EmployeeDraft, EmployeeId};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use crate::tracking::EntityKey;
use rusqlite::{params, Connection, OptionalExtension, Row};

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    id,
    company_id,
    first_name,
    last_name,
    email,
    phone_number
FROM employee";

/// Repository interface for employee persistence.
pub trait EmployeeRepository {
    fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    fn list(&self) -> RepoResult<Vec<Employee>>;
    fn list_by_company(&self, company_id: CompanyId) -> RepoResult<Vec<Employee>>;
    fn save(&self, employee: &mut Employee) -> RepoResult<EmployeeId>;
    fn delete(&self, id: EmployeeId) -> RepoResult<()>;
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    /// Wraps a connection already known to be migrated.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after verifying its schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self::new(conn))
    }

    fn query_employees(&self, sql: &str, bind: Option<i64>) -> RepoResult<Vec<Employee>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = match bind {
            Some(value) => stmt.query([value])?,
            None => stmt.query([])?,
        };
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(into_employee(read_employee_row(row)?)?);
        }
        Ok(employees)
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        self.conn
            .query_row(
                &format!("{EMPLOYEE_SELECT_SQL} WHERE id = ?1;"),
                [id],
                read_employee_row,
            )
            .optional()?
            .map(into_employee)
            .transpose()
    }

    fn list(&self) -> RepoResult<Vec<Employee>> {
        self.query_employees(&format!("{EMPLOYEE_SELECT_SQL} ORDER BY id ASC;"), None)
    }

    fn list_by_company(&self, company_id: CompanyId) -> RepoResult<Vec<Employee>> {
        self.query_employees(
            &format!("{EMPLOYEE_SELECT_SQL} WHERE company_id = ?1 ORDER BY id ASC;"),
            Some(company_id),
        )
    }

    fn save(&self, employee: &mut Employee) -> RepoResult<EmployeeId> {
        match employee.id() {
            None => {
                self.conn.execute(
                    "INSERT INTO employee (
                        company_id,
                        first_name,
                        last_name,
                        email,
                        phone_number
                    ) VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        employee.company_id(),
                        employee.first_name(),
                        employee.last_name(),
                        employee.email(),
                        employee.phone_number(),
                    ],
                )?;
                let id = self.conn.last_insert_rowid();
                employee.assign_id(id);
                Ok(id)
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE employee
                     SET
                        company_id = ?1,
                        first_name = ?2,
                        last_name = ?3,
                        email = ?4,
                        phone_number = ?5
                     WHERE id = ?6;",
                    params![
                        employee.company_id(),
                        employee.first_name(),
                        employee.last_name(),
                        employee.email(),
                        employee.phone_number(),
                        id,
                    ],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound(EntityKey::employee(id)));
                }
                Ok(id)
            }
        }
    }

    fn delete(&self, id: EmployeeId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM employee WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityKey::employee(id)));
        }
        Ok(())
    }
}

struct EmployeeRow {
    id: i64,
    company_id: Option<i64>,
    first_name: String,
    last_name: String,
    email: String,
    phone_number: String,
}

fn read_employee_row(row: &Row<'_>) -> rusqlite::Result<EmployeeRow> {
    Ok(EmployeeRow {
        id: row.get("id")?,
        company_id: row.get("company_id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        phone_number: row.get("phone_number")?,
    })
}

fn into_employee(row: EmployeeRow) -> RepoResult<Employee> {
    for (column, value) in [
        ("first_name", &row.first_name),
        ("last_name", &row.last_name),
        ("email", &row.email),
    ] {
        if value.trim().is_empty() {
            return Err(RepoError::InvalidData(format!(
                "blank value in employee.{column} for id {}",
                row.id
            )));
        }
    }
    Ok(Employee::from_persisted(
        row.id,
        EmployeeDraft {
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone_number: row.phone_number,
        },
        row.company_id,
    ))
}
