//! Company repository contract and SQLite implementation.
//!
//! # Invariants
//! - `save` inserts when the company has no id and assigns the generated
//!   id; otherwise it updates the existing row or fails with `NotFound`.
//! - Deleting a company leaves its employees in place with a NULL
//!   `company_id` (enforced by the schema's `ON DELETE SET NULL`).

use crate::model::company::{Company, CompanyDraft, CompanyId};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use crate::tracking::EntityKey;
use rusqlite::{params, Connection, OptionalExtension, Row};

const COMPANY_SELECT_SQL: &str = "SELECT
    id,
    name,
    nip,
    address,
    city,
    postal_code
FROM company";

/// Repository interface for company persistence.
pub trait CompanyRepository {
    fn find_by_id(&self, id: CompanyId) -> RepoResult<Option<Company>>;
    fn list(&self) -> RepoResult<Vec<Company>>;
    fn save(&self, company: &mut Company) -> RepoResult<CompanyId>;
    fn delete(&self, id: CompanyId) -> RepoResult<()>;
    fn exists(&self, id: CompanyId) -> RepoResult<bool>;
}

/// SQLite-backed company repository.
///
/// Works on a plain connection or, through deref, on an open transaction.
pub struct SqliteCompanyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCompanyRepository<'conn> {
    /// Wraps a connection already known to be migrated.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after verifying its schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self::new(conn))
    }
}

impl CompanyRepository for SqliteCompanyRepository<'_> {
    fn find_by_id(&self, id: CompanyId) -> RepoResult<Option<Company>> {
        self.conn
            .query_row(
                &format!("{COMPANY_SELECT_SQL} WHERE id = ?1;"),
                [id],
                read_company_row,
            )
            .optional()?
            .map(into_company)
            .transpose()
    }

    fn list(&self) -> RepoResult<Vec<Company>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMPANY_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut companies = Vec::new();
        while let Some(row) = rows.next()? {
            companies.push(into_company(read_company_row(row)?)?);
        }
        Ok(companies)
    }

    fn save(&self, company: &mut Company) -> RepoResult<CompanyId> {
        match company.id() {
            None => {
                self.conn.execute(
                    "INSERT INTO company (name, nip, address, city, postal_code)
                     VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        company.name(),
                        company.nip(),
                        company.address(),
                        company.city(),
                        company.postal_code(),
                    ],
                )?;
                let id = self.conn.last_insert_rowid();
                company.assign_id(id);
                Ok(id)
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE company
                     SET
                        name = ?1,
                        nip = ?2,
                        address = ?3,
                        city = ?4,
                        postal_code = ?5
                     WHERE id = ?6;",
                    params![
                        company.name(),
                        company.nip(),
                        company.address(),
                        company.city(),
                        company.postal_code(),
                        id,
                    ],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound(EntityKey::company(id)));
                }
                Ok(id)
            }
        }
    }

    fn delete(&self, id: CompanyId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM company WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityKey::company(id)));
        }
        Ok(())
    }

    fn exists(&self, id: CompanyId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM company WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

type CompanyRow = (i64, String, String, String, String, String);

fn read_company_row(row: &Row<'_>) -> rusqlite::Result<CompanyRow> {
    Ok((
        row.get("id")?,
        row.get("name")?,
        row.get("nip")?,
        row.get("address")?,
        row.get("city")?,
        row.get("postal_code")?,
    ))
}

fn into_company(row: CompanyRow) -> RepoResult<Company> {
    let (id, name, nip, address, city, postal_code) = row;
    for (column, value) in [
        ("name", &name),
        ("nip", &nip),
        ("address", &address),
        ("city", &city),
        ("postal_code", &postal_code),
    ] {
        if value.trim().is_empty() {
            return Err(RepoError::InvalidData(format!(
                "blank value in company.{column} for id {id}"
            )));
        }
    }
    Ok(Company::from_persisted(
        id,
        CompanyDraft {
            name,
            nip,
            address,
            city,
            postal_code,
        },
    ))
}
