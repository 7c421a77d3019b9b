//! Pure validation for company/employee input.
//!
//! # Responsibility
//! - Turn raw `CompanyInput`/`EmployeeInput` into validated drafts (create)
//!   or patches (partial update).
//! - Report every failing field at once.
//!
//! # Invariants
//! - Validation never touches storage.
//! - Accepted string values are trimmed; required values are non-blank.
//! - Length limits live here only; the SQLite columns are unbounded `TEXT`.

use crate::model::company::{CompanyDraft, CompanyPatch};
use crate::model::employee::{EmployeeDraft, EmployeePatch};
use crate::model::input::{CompanyInput, EmployeeInput};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const NAME_MAX_CHARS: usize = 255;
const NIP_MAX_CHARS: usize = 10;
const ADDRESS_MAX_CHARS: usize = 100;
const CITY_MAX_CHARS: usize = 50;
const POSTAL_CODE_MAX_CHARS: usize = 10;
const PERSON_NAME_MAX_CHARS: usize = 50;
const EMAIL_MAX_CHARS: usize = 100;
const PHONE_MAX_CHARS: usize = 15;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("valid email regex")
});

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Input key as the caller spelled it, e.g. `postalCode` or
    /// `employees[1].email` for nested input.
    pub field: String,
    pub message: String,
}

/// Non-empty list of field errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns whether any error was reported for `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    /// Qualifies every field name with `prefix`, e.g. `employees[0]`.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        for error in &mut self.errors {
            error.field = format!("{prefix}.{}", error.field);
        }
        self
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, error) in self.errors.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}

/// Validates input for a new company. Every field is required.
pub fn validate_new_company(input: &CompanyInput) -> Result<CompanyDraft, ValidationErrors> {
    let mut collector = Collector::default();
    let name = collector.required("name", input.name.as_deref(), NAME_MAX_CHARS);
    let nip = collector.required("nip", input.nip.as_deref(), NIP_MAX_CHARS);
    let address = collector.required("address", input.address.as_deref(), ADDRESS_MAX_CHARS);
    let city = collector.required("city", input.city.as_deref(), CITY_MAX_CHARS);
    let postal_code = collector.required(
        "postalCode",
        input.postal_code.as_deref(),
        POSTAL_CODE_MAX_CHARS,
    );
    collector.finish()?;

    match (name, nip, address, city, postal_code) {
        (Some(name), Some(nip), Some(address), Some(city), Some(postal_code)) => Ok(CompanyDraft {
            name,
            nip,
            address,
            city,
            postal_code,
        }),
        _ => Err(ValidationErrors::single(
            "company",
            "company input is incomplete",
        )),
    }
}

/// Validates a partial company update.
///
/// Absent fields are left alone; present fields must still be non-blank.
pub fn validate_company_patch(input: &CompanyInput) -> Result<CompanyPatch, ValidationErrors> {
    let mut collector = Collector::default();
    let patch = CompanyPatch {
        name: collector.optional("name", input.name.as_deref(), NAME_MAX_CHARS),
        nip: collector.optional("nip", input.nip.as_deref(), NIP_MAX_CHARS),
        address: collector.optional("address", input.address.as_deref(), ADDRESS_MAX_CHARS),
        city: collector.optional("city", input.city.as_deref(), CITY_MAX_CHARS),
        postal_code: collector.optional(
            "postalCode",
            input.postal_code.as_deref(),
            POSTAL_CODE_MAX_CHARS,
        ),
    };
    collector.finish()?;
    Ok(patch)
}

/// Validates input for a new employee.
///
/// Names and email are required; a missing phone number becomes `""`.
pub fn validate_new_employee(input: &EmployeeInput) -> Result<EmployeeDraft, ValidationErrors> {
    let mut collector = Collector::default();
    let first_name = collector.required(
        "firstName",
        input.first_name.as_deref(),
        PERSON_NAME_MAX_CHARS,
    );
    let last_name = collector.required(
        "lastName",
        input.last_name.as_deref(),
        PERSON_NAME_MAX_CHARS,
    );
    let email = collector
        .required("email", input.email.as_deref(), EMAIL_MAX_CHARS)
        .and_then(|email| collector.email(email));
    let phone_number = collector
        .phone(input.phone_number.as_deref())
        .unwrap_or_default();
    collector.finish()?;

    match (first_name, last_name, email) {
        (Some(first_name), Some(last_name), Some(email)) => Ok(EmployeeDraft {
            first_name,
            last_name,
            email,
            phone_number,
        }),
        _ => Err(ValidationErrors::single(
            "employee",
            "employee input is incomplete",
        )),
    }
}

/// Validates a partial employee update.
///
/// A present email must be well-formed; it is never silently skipped.
pub fn validate_employee_patch(input: &EmployeeInput) -> Result<EmployeePatch, ValidationErrors> {
    let mut collector = Collector::default();
    let first_name = collector.optional(
        "firstName",
        input.first_name.as_deref(),
        PERSON_NAME_MAX_CHARS,
    );
    let last_name = collector.optional(
        "lastName",
        input.last_name.as_deref(),
        PERSON_NAME_MAX_CHARS,
    );
    let email = collector
        .optional("email", input.email.as_deref(), EMAIL_MAX_CHARS)
        .and_then(|email| collector.email(email));
    let phone_number = collector.phone(input.phone_number.as_deref());
    collector.finish()?;

    Ok(EmployeePatch {
        first_name,
        last_name,
        email,
        phone_number,
    })
}

/// Returns whether `value` has standard `local@domain.tld` address syntax.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

#[derive(Default)]
struct Collector {
    errors: Vec<FieldError>,
}

impl Collector {
    fn push(&mut self, field: &str, message: String) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message,
        });
    }

    fn required(&mut self, field: &str, value: Option<&str>, max_chars: usize) -> Option<String> {
        match value.map(str::trim) {
            None | Some("") => {
                self.push(field, "field is required and cannot be empty".to_string());
                None
            }
            Some(trimmed) => self.bounded(field, trimmed, max_chars),
        }
    }

    fn optional(&mut self, field: &str, value: Option<&str>, max_chars: usize) -> Option<String> {
        match value.map(str::trim) {
            None => None,
            Some("") => {
                self.push(field, "field cannot be empty".to_string());
                None
            }
            Some(trimmed) => self.bounded(field, trimmed, max_chars),
        }
    }

    fn bounded(&mut self, field: &str, trimmed: &str, max_chars: usize) -> Option<String> {
        if trimmed.chars().count() > max_chars {
            self.push(field, format!("field must be at most {max_chars} characters"));
            return None;
        }
        Some(trimmed.to_string())
    }

    fn email(&mut self, email: String) -> Option<String> {
        if is_valid_email(&email) {
            Some(email)
        } else {
            self.push("email", "invalid email format".to_string());
            None
        }
    }

    // Phone is the only optional-and-blank-allowed field.
    fn phone(&mut self, value: Option<&str>) -> Option<String> {
        let trimmed = value?.trim();
        if trimmed.is_empty() {
            return Some(String::new());
        }
        self.bounded("phoneNumber", trimmed, PHONE_MAX_CHARS)
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                errors: self.errors,
            })
        }
    }
}
