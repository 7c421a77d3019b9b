//! Company/employee domain model.
//!
//! # Responsibility
//! - Define the two persisted entities and their validated construction paths.
//! - Keep raw caller input separate from validated drafts and patches.
//!
//! # Invariants
//! - Entity ids are assigned by storage exactly once and never reassigned.
//! - Entity fields change only through validated drafts/patches, so every
//!   in-memory value is trimmed and non-blank where required.

pub mod company;
pub mod employee;
pub mod input;
pub mod validation;
