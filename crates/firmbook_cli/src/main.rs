//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `firmbook_core` and `firmbook_api` wiring against the configured
//!   database.
//! - Replay the create/update/no-op/delete flow on an in-memory database and
//!   print one `key=value` line per step.

use firmbook_api::{create_company, delete_company, get_employee, update_company, ApiResponse};
use firmbook_core::db::migrations::current_user_version;
use firmbook_core::db::{open_db, open_db_in_memory};
use firmbook_core::{core_version, init_logging, FirmbookConfig};
use std::process::ExitCode;

const DEMO_COMPANY: &str = r#"{
    "name": "Acme",
    "nip": "1234567890",
    "address": "Main 1",
    "city": "Springfield",
    "postalCode": "00-001",
    "employees": [
        { "firstName": "Jo", "lastName": "Doe", "email": "jo@example.com" }
    ]
}"#;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("firmbook_cli error={message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = FirmbookConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level.as_str(), &log_dir.to_string_lossy())
            .map_err(|err| err.to_string())?;
    }

    println!("firmbook_core version={}", core_version());
    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let schema_version = current_user_version(&conn).map_err(|err| err.to_string())?;
    println!(
        "firmbook_core db_path={} schema_version={}",
        config.db_path.display(),
        schema_version
    );
    drop(conn);

    run_demo()
}

fn run_demo() -> Result<(), String> {
    let mut conn = open_db_in_memory().map_err(|err| err.to_string())?;

    let created = create_company(&mut conn, DEMO_COMPANY);
    print_step("create_company", &created);
    let company_id = created.body["id"]
        .as_i64()
        .ok_or_else(|| format!("create_company failed: {}", created.body))?;
    let employee_id = created.body["employees"][0]["id"]
        .as_i64()
        .ok_or_else(|| "create_company returned no employee".to_string())?;

    let update = r#"{"city": "Shelbyville"}"#;
    print_step("update_company", &update_company(&mut conn, company_id, update));
    print_step("update_company_again", &update_company(&mut conn, company_id, update));
    print_step("delete_company", &delete_company(&mut conn, company_id));

    let employee = get_employee(&mut conn, employee_id);
    print_step("get_employee", &employee);
    println!("demo employee_company_id={}", employee.body["companyId"]);
    Ok(())
}

fn print_step(step: &str, response: &ApiResponse) {
    println!("demo step={} status={}", step, response.status);
}
