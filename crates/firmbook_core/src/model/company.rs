//! Company entity.

use crate::tracking::{EntityKind, FieldValue, FieldValues, Tracked};
use serde::Serialize;

/// Surrogate key assigned by storage on first insert.
pub type CompanyId = i64;

/// Validated field set for a company that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyDraft {
    pub name: String,
    pub nip: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
}

/// Validated partial update. `None` leaves the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyPatch {
    pub name: Option<String>,
    pub nip: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
}

impl CompanyPatch {
    /// Returns whether the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.nip.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.postal_code.is_none()
    }
}

/// Company record. Owns zero or more employees through `Employee::company_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    id: Option<CompanyId>,
    name: String,
    nip: String,
    address: String,
    city: String,
    postal_code: String,
}

impl Company {
    /// Builds an unsaved company from validated fields.
    pub fn new(draft: CompanyDraft) -> Self {
        Self {
            id: None,
            name: draft.name,
            nip: draft.nip,
            address: draft.address,
            city: draft.city,
            postal_code: draft.postal_code,
        }
    }

    pub(crate) fn from_persisted(id: CompanyId, draft: CompanyDraft) -> Self {
        let mut company = Self::new(draft);
        company.id = Some(id);
        company
    }

    pub fn id(&self) -> Option<CompanyId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nip(&self) -> &str {
        &self.nip
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    /// Applies every field present in `patch`.
    ///
    /// Assigning a value equal to the current one is allowed; the change
    /// tracker, not the caller, decides whether anything changed.
    pub fn apply_patch(&mut self, patch: &CompanyPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(nip) = &patch.nip {
            self.nip.clone_from(nip);
        }
        if let Some(address) = &patch.address {
            self.address.clone_from(address);
        }
        if let Some(city) = &patch.city {
            self.city.clone_from(city);
        }
        if let Some(postal_code) = &patch.postal_code {
            self.postal_code.clone_from(postal_code);
        }
    }

    /// Records the storage-assigned id.
    ///
    /// # Invariants
    /// - Only called once, right after the insert that produced `id`.
    pub(crate) fn assign_id(&mut self, id: CompanyId) {
        debug_assert!(self.id.is_none(), "company id must not be reassigned");
        self.id = Some(id);
    }
}

impl Tracked for Company {
    const KIND: EntityKind = EntityKind::Company;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn field_values(&self) -> FieldValues {
        FieldValues::from([
            ("name", FieldValue::from(self.name.as_str())),
            ("nip", FieldValue::from(self.nip.as_str())),
            ("address", FieldValue::from(self.address.as_str())),
            ("city", FieldValue::from(self.city.as_str())),
            ("postal_code", FieldValue::from(self.postal_code.as_str())),
        ])
    }
}
