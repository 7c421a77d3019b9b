//! Handler layer for firmbook.
//!
//! # Responsibility
//! - Mirror the HTTP routes as plain functions over a migrated connection.
//! - Parse JSON request bodies into core input types.
//! - Map core outcomes to status codes and JSON bodies.
//!
//! # Invariants
//! - Route functions never panic; every failure becomes an `ApiResponse`.
//! - One service, and so one change tracker, per call.

pub mod company_routes;
pub mod employee_routes;
pub mod response;

pub use company_routes::{
    add_company_employees, create_company, delete_company, get_company, list_companies,
    list_company_employees, update_company,
};
pub use employee_routes::{
    create_employee, delete_employee, get_employee, list_employees, update_employee,
    update_employee_company,
};
pub use response::ApiResponse;
