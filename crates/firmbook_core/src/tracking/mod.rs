//! Snapshot-based change tracking for persisted entities.
//!
//! # Responsibility
//! - Describe an entity as a flat map of persistable field values.
//! - Hold the last-known-persisted snapshot per entity identity and diff
//!   current values against it.
//!
//! # Invariants
//! - An entity is keyed by `(EntityKind, id)`; entities without an id have
//!   no snapshot and are always dirty.
//! - Snapshots are only (re)captured from state known to be committed.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

mod change_tracker;

pub use change_tracker::{ChangeSet, ChangeTracker, FieldChange};

/// Persisted entity families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Company,
    Employee,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Employee => "employee",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one persisted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: i64,
}

impl EntityKey {
    pub fn company(id: i64) -> Self {
        Self {
            kind: EntityKind::Company,
            id,
        }
    }

    pub fn employee(id: i64) -> Self {
        Self {
            kind: EntityKind::Employee,
            id,
        }
    }
}

impl Display for EntityKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// Storage-agnostic scalar value of one tracked field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Text(String),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Option<i64>> for FieldValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Self::Null, Self::Integer)
    }
}

/// Field name to value, ordered so diffs are deterministic.
pub type FieldValues = BTreeMap<&'static str, FieldValue>;

/// An entity whose persistable state can be snapshotted and diffed.
pub trait Tracked {
    const KIND: EntityKind;

    /// Storage-assigned id, `None` until the first insert.
    fn id(&self) -> Option<i64>;

    /// Current values of every persisted column except the id.
    fn field_values(&self) -> FieldValues;

    fn entity_key(&self) -> Option<EntityKey> {
        self.id().map(|id| EntityKey {
            kind: Self::KIND,
            id,
        })
    }
}
