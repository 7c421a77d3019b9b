//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - One repository per entity type with `find_by_id`/`list`/`save`/`delete`.
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Repositories never commit: they run on whatever connection or
//!   transaction they were built from.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Constraint violations surface as `RepoError::ConstraintViolation`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::tracking::EntityKey;
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod company_repo;
pub mod employee_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for company/employee persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(EntityKey),
    /// The store rejected a write, e.g. a duplicate email or nip.
    ConstraintViolation(String),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(key) => write!(f, "{} with id {} not found", key.kind, key.id),
            Self::ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => Self::from(err),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(err, message)
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Self::ConstraintViolation(message.unwrap_or_else(|| err.to_string()))
            }
            other => Self::Db(DbError::Sqlite(other)),
        }
    }
}

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("company", &["id", "name", "nip", "address", "city", "postal_code"]),
    (
        "employee",
        &[
            "id",
            "company_id",
            "first_name",
            "last_name",
            "email",
            "phone_number",
        ],
    ),
];

/// Verifies that `conn` was opened through `open_db` and carries the
/// expected tables and columns.
pub fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for column in columns.iter().copied() {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    Ok(conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_schema WHERE type = 'table' AND name = ?1;",
        [table],
        |row| row.get(0),
    )?)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    Ok(conn.query_row(
        "SELECT COUNT(*) > 0 FROM pragma_table_info(?1) WHERE name = ?2;",
        [table, column],
        |row| row.get(0),
    )?)
}
