//! Employee entity.

use crate::model::company::CompanyId;
use crate::tracking::{EntityKind, FieldValue, FieldValues, Tracked};
use serde::Serialize;

pub type EmployeeId = i64;

/// Validated field set for an employee that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Empty string when the caller supplied no phone number.
    pub phone_number: String,
}

/// Validated partial update. `None` leaves the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

/// Employee record with an optional company reference.
///
/// The reference is nulled by storage when the company is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    id: Option<EmployeeId>,
    first_name: String,
    last_name: String,
    email: String,
    phone_number: String,
    company_id: Option<CompanyId>,
}

impl Employee {
    /// Builds an unsaved, unassigned employee from validated fields.
    pub fn new(draft: EmployeeDraft) -> Self {
        Self {
            id: None,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            phone_number: draft.phone_number,
            company_id: None,
        }
    }

    pub(crate) fn from_persisted(
        id: EmployeeId,
        draft: EmployeeDraft,
        company_id: Option<CompanyId>,
    ) -> Self {
        let mut employee = Self::new(draft);
        employee.id = Some(id);
        employee.company_id = company_id;
        employee
    }

    pub fn id(&self) -> Option<EmployeeId> {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn company_id(&self) -> Option<CompanyId> {
        self.company_id
    }

    /// Applies every field present in `patch`.
    pub fn apply_patch(&mut self, patch: &EmployeePatch) {
        if let Some(first_name) = &patch.first_name {
            self.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name.clone_from(last_name);
        }
        if let Some(email) = &patch.email {
            self.email.clone_from(email);
        }
        if let Some(phone_number) = &patch.phone_number {
            self.phone_number.clone_from(phone_number);
        }
    }

    /// Points this employee at `company_id`, or detaches it with `None`.
    ///
    /// Existence of the company is checked by the caller.
    pub fn assign_company(&mut self, company_id: Option<CompanyId>) {
        self.company_id = company_id;
    }

    pub(crate) fn assign_id(&mut self, id: EmployeeId) {
        debug_assert!(self.id.is_none(), "employee id must not be reassigned");
        self.id = Some(id);
    }
}

impl Tracked for Employee {
    const KIND: EntityKind = EntityKind::Employee;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn field_values(&self) -> FieldValues {
        FieldValues::from([
            ("first_name", FieldValue::from(self.first_name.as_str())),
            ("last_name", FieldValue::from(self.last_name.as_str())),
            ("email", FieldValue::from(self.email.as_str())),
            ("phone_number", FieldValue::from(self.phone_number.as_str())),
            ("company_id", FieldValue::from(self.company_id)),
        ])
    }
}
