#![allow(dead_code)]

use firmbook_core::{CompanyInput, EmployeeInput};
use rusqlite::Connection;

pub fn acme() -> CompanyInput {
    CompanyInput {
        name: Some("Acme".to_string()),
        nip: Some("1234567890".to_string()),
        address: Some("Main 1".to_string()),
        city: Some("Springfield".to_string()),
        postal_code: Some("00-001".to_string()),
    }
}

pub fn globex() -> CompanyInput {
    CompanyInput {
        name: Some("Globex".to_string()),
        nip: Some("0987654321".to_string()),
        address: Some("Oak 7".to_string()),
        city: Some("Cypress Creek".to_string()),
        postal_code: Some("11-111".to_string()),
    }
}

pub fn employee(first_name: &str, email: &str) -> EmployeeInput {
    EmployeeInput {
        first_name: Some(first_name.to_string()),
        last_name: Some("Doe".to_string()),
        email: Some(email.to_string()),
        phone_number: None,
    }
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
