//! Connection bootstrap.
//!
//! # Invariants
//! - Returned connections enforce foreign keys; the `ON DELETE SET NULL`
//!   employee reference depends on it.
//! - Returned connections are migrated to the latest schema version.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (creating when absent) the database file at `path`.
///
/// Emits one `db_open` event with duration and, on success, the number of
/// migrations applied.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with("file", || Connection::open(path))
}

/// Opens a private in-memory database, used by tests and the CLI demo.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &'static str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let outcome = connect()
        .map_err(|err| ("db_open_failed", DbError::from(err)))
        .and_then(|mut conn| match bootstrap(&mut conn) {
            Ok(applied) => Ok((conn, applied)),
            Err(err) => Err(("db_bootstrap_failed", err)),
        });
    let duration_ms = started_at.elapsed().as_millis();

    match outcome {
        Ok((conn, applied)) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={duration_ms} migrations_applied={applied}"
            );
            Ok(conn)
        }
        Err((error_code, err)) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={duration_ms} error_code={error_code} error={err}"
            );
            Err(err)
        }
    }
}

fn bootstrap(conn: &mut Connection) -> DbResult<usize> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)
}
