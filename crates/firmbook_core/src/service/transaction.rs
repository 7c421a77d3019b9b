//! Scoped transaction primitive.
//!
//! # Invariants
//! - The transaction is opened with `BEGIN IMMEDIATE`, so the write lock is
//!   held from the first statement of the unit of work.
//! - Every exit path closes the transaction: commit on `Ok`, explicit
//!   rollback on `Err`, rollback-on-drop on panic.
//! - Snapshot updates staged inside the scope reach the tracker only after
//!   a successful commit.
//! - The unit of work's error is returned unchanged after rollback.

use crate::repo::company_repo::SqliteCompanyRepository;
use crate::repo::employee_repo::SqliteEmployeeRepository;
use crate::service::ServiceResult;
use crate::tracking::{ChangeTracker, EntityKey, FieldValues, Tracked};
use log::{debug, error, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::time::Instant;

enum StagedSnapshot {
    Capture(EntityKey, FieldValues),
    Forget(EntityKey),
}

/// Handle passed into a unit of work.
///
/// Repositories built from it run inside the open transaction.
pub struct TransactionScope<'conn> {
    tx: Transaction<'conn>,
    staged: Vec<StagedSnapshot>,
}

impl TransactionScope<'_> {
    pub fn companies(&self) -> SqliteCompanyRepository<'_> {
        SqliteCompanyRepository::new(&self.tx)
    }

    pub fn employees(&self) -> SqliteEmployeeRepository<'_> {
        SqliteEmployeeRepository::new(&self.tx)
    }

    /// Raw access for statements no repository covers.
    pub fn connection(&self) -> &Connection {
        &self.tx
    }

    /// Schedules `entity`'s current values as its snapshot once committed.
    pub fn stage_snapshot<E: Tracked>(&mut self, entity: &E) {
        if let Some(key) = entity.entity_key() {
            self.staged
                .push(StagedSnapshot::Capture(key, entity.field_values()));
        }
    }

    /// Schedules removal of `key` from the tracker once committed.
    pub fn stage_forget(&mut self, key: EntityKey) {
        self.staged.push(StagedSnapshot::Forget(key));
    }
}

/// Runs `work` inside one transaction on `conn`.
///
/// Commits when `work` returns `Ok` and applies staged snapshots to
/// `tracker`; otherwise rolls back and returns the original error.
pub fn run_in_transaction<T, F>(
    conn: &mut Connection,
    tracker: &mut ChangeTracker,
    work: F,
) -> ServiceResult<T>
where
    F: FnOnce(&mut TransactionScope<'_>) -> ServiceResult<T>,
{
    let started_at = Instant::now();
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut scope = TransactionScope {
        tx,
        staged: Vec::new(),
    };

    match work(&mut scope) {
        Ok(value) => {
            let TransactionScope { tx, staged } = scope;
            if let Err(err) = tx.commit() {
                error!(
                    "event=transaction_commit module=service status=error duration_ms={} error_code=commit_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
            let staged_count = staged.len();
            for staged_snapshot in staged {
                match staged_snapshot {
                    StagedSnapshot::Capture(key, values) => tracker.capture_values(key, values),
                    StagedSnapshot::Forget(key) => tracker.forget(key),
                }
            }
            debug!(
                "event=transaction_commit module=service status=ok duration_ms={} snapshots={}",
                started_at.elapsed().as_millis(),
                staged_count
            );
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = scope.tx.rollback() {
                error!(
                    "event=transaction_rollback module=service status=error error_code=rollback_failed error={}",
                    rollback_err
                );
            }
            warn!(
                "event=transaction_rollback module=service status=ok duration_ms={} error_code={}",
                started_at.elapsed().as_millis(),
                err.code()
            );
            Err(err)
        }
    }
}
