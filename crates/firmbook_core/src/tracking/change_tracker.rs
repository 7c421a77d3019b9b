//! Dirty-checking over explicit snapshots.
//!
//! # Invariants
//! - `register` is idempotent and never overwrites an existing snapshot.
//! - A registered entity without a snapshot reports every field as changed.
//! - `is_dirty(e)` is false right after `capture(e)` until a field of `e`
//!   changes.

use super::{EntityKey, FieldValue, FieldValues, Tracked};
use std::collections::HashMap;

/// One field whose current value differs from its snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: &'static str,
    /// `None` when there is no snapshot to compare against.
    pub before: Option<FieldValue>,
    pub after: FieldValue,
}

/// Field-level difference between an entity and its snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<FieldChange>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn changes(&self) -> &[FieldChange] {
        &self.changes
    }

    /// Names of the changed fields in deterministic order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.changes.iter().map(|change| change.field).collect()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.changes.iter().any(|change| change.field == field)
    }
}

/// Request-scoped map from entity identity to last-persisted field values.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    // `None` marks an entity registered before any snapshot exists.
    entries: HashMap<EntityKey, Option<FieldValues>>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `entity` without capturing a snapshot.
    ///
    /// Returns `true` when the entity was not tracked before. Entities
    /// without an id cannot be keyed and are never registered.
    pub fn register<E: Tracked>(&mut self, entity: &E) -> bool {
        let Some(key) = entity.entity_key() else {
            return false;
        };
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, None);
        true
    }

    /// Records the current values of `entity` as its persisted baseline.
    ///
    /// Call only with state known to match storage: right after a load or
    /// after the write that stored it has committed.
    pub fn capture<E: Tracked>(&mut self, entity: &E) {
        if let Some(key) = entity.entity_key() {
            self.capture_values(key, entity.field_values());
        }
    }

    pub(crate) fn capture_values(&mut self, key: EntityKey, values: FieldValues) {
        self.entries.insert(key, Some(values));
    }

    /// Stops tracking `key`, typically after the row was deleted.
    pub fn forget(&mut self, key: EntityKey) {
        self.entries.remove(&key);
    }

    pub fn is_tracked<E: Tracked>(&self, entity: &E) -> bool {
        entity
            .entity_key()
            .is_some_and(|key| self.entries.contains_key(&key))
    }

    /// Last captured snapshot for `key`, if any.
    pub fn snapshot(&self, key: EntityKey) -> Option<&FieldValues> {
        self.entries.get(&key).and_then(Option::as_ref)
    }

    /// Number of tracked entities, with or without snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recomputes the field-by-field difference for `entity`.
    ///
    /// Registers the entity first when it is not tracked yet.
    pub fn change_set<E: Tracked>(&mut self, entity: &E) -> ChangeSet {
        self.register(entity);
        let snapshot = entity.entity_key().and_then(|key| self.snapshot(key));
        diff(snapshot, entity.field_values())
    }

    /// Returns whether any tracked field of `entity` differs from its
    /// snapshot. Never-persisted entities are always dirty.
    pub fn is_dirty<E: Tracked>(&mut self, entity: &E) -> bool {
        !self.change_set(entity).is_empty()
    }
}

fn diff(snapshot: Option<&FieldValues>, current: FieldValues) -> ChangeSet {
    let changes = current
        .into_iter()
        .filter_map(|(field, after)| {
            let before = snapshot.and_then(|values| values.get(field));
            if before == Some(&after) {
                return None;
            }
            Some(FieldChange {
                field,
                before: before.cloned(),
                after,
            })
        })
        .collect();
    ChangeSet { changes }
}
