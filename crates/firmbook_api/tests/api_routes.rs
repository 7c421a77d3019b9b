use firmbook_api::{
    add_company_employees, create_company, create_employee, delete_company, delete_employee,
    get_company, get_employee, list_companies, list_company_employees, list_employees,
    update_company, update_employee, update_employee_company,
};
use firmbook_core::db::open_db_in_memory;
use rusqlite::Connection;
use serde_json::{json, Value};

const ACME: &str = r#"{
    "name": "Acme",
    "nip": "1234567890",
    "address": "Main 1",
    "city": "Springfield",
    "postalCode": "00-001",
    "employees": [
        { "firstName": "Jo", "lastName": "Doe", "email": "jo@x.com" }
    ]
}"#;

fn created_id(body: &Value) -> i64 {
    body["id"].as_i64().unwrap()
}

fn seed_acme(conn: &mut Connection) -> Value {
    let response = create_company(conn, ACME);
    assert_eq!(response.status, 201, "{}", response.body);
    response.body
}

#[test]
fn create_then_identical_put_is_not_modified() {
    let mut conn = open_db_in_memory().unwrap();
    let created = seed_acme(&mut conn);
    let id = created_id(&created);

    assert_eq!(created["name"], "Acme");
    assert_eq!(created["postalCode"], "00-001");
    assert_eq!(created["employees"][0]["companyId"], json!(id));
    assert_eq!(created["employees"][0]["phoneNumber"], "");

    let first = update_company(&mut conn, id, r#"{"city": "Shelbyville"}"#);
    assert_eq!(first.status, 200);
    assert_eq!(first.body, json!({ "message": "Company updated successfully" }));

    let repeated = update_company(&mut conn, id, r#"{"city": "Shelbyville"}"#);
    assert_eq!(repeated.status, 304);
    assert_eq!(repeated.body, json!({ "message": "No changes detected" }));
}

#[test]
fn create_company_validation_failures_are_bad_requests() {
    let mut conn = open_db_in_memory().unwrap();

    let missing = create_company(&mut conn, r#"{"name": "Acme"}"#);
    assert_eq!(missing.status, 400);
    let fields = missing.body["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 4);

    let bad_employee = create_company(
        &mut conn,
        &ACME.replace("jo@x.com", "not-an-email"),
    );
    assert_eq!(bad_employee.status, 400);
    assert_eq!(bad_employee.body["fields"][0]["field"], "employees[0].email");

    let malformed = create_company(&mut conn, "{");
    assert_eq!(malformed.status, 400);

    assert_eq!(list_companies(&mut conn).body, json!([]));
}

#[test]
fn duplicate_email_in_batch_is_a_conflict() {
    let mut conn = open_db_in_memory().unwrap();
    let body = r#"{
        "name": "Acme", "nip": "1234567890", "address": "Main 1",
        "city": "Springfield", "postalCode": "00-001",
        "employees": [
            { "firstName": "Jo", "lastName": "Doe", "email": "jo@x.com" },
            { "firstName": "Al", "lastName": "Doe", "email": "jo@x.com" }
        ]
    }"#;

    let response = create_company(&mut conn, body);
    assert_eq!(response.status, 409);
    assert!(response.body["error"].is_string());
    assert_eq!(list_employees(&mut conn).body, json!([]));
    assert_eq!(list_companies(&mut conn).body, json!([]));
}

#[test]
fn missing_entities_answer_not_found() {
    let mut conn = open_db_in_memory().unwrap();

    let company = get_company(&mut conn, 42);
    assert_eq!(company.status, 404);
    assert_eq!(company.body, json!({ "error": "company with id 42 not found" }));

    assert_eq!(get_employee(&mut conn, 42).status, 404);
    assert_eq!(update_company(&mut conn, 42, "{}").status, 404);
    assert_eq!(delete_employee(&mut conn, 42).status, 404);
    assert_eq!(list_company_employees(&mut conn, 42).status, 404);
}

#[test]
fn employee_update_rejects_malformed_email() {
    let mut conn = open_db_in_memory().unwrap();
    let created = seed_acme(&mut conn);
    let employee_id = created["employees"][0]["id"].as_i64().unwrap();

    let response = update_employee(&mut conn, employee_id, r#"{"email": "nope"}"#);
    assert_eq!(response.status, 400);
    assert_eq!(response.body["fields"][0]["field"], "email");

    let unchanged = update_employee(&mut conn, employee_id, r#"{"firstName": " Jo "}"#);
    assert_eq!(unchanged.status, 304);

    let changed = update_employee(&mut conn, employee_id, r#"{"phoneNumber": "555-0100"}"#);
    assert_eq!(changed.status, 200);
    assert_eq!(
        get_employee(&mut conn, employee_id).body["phoneNumber"],
        "555-0100"
    );
}

#[test]
fn employee_company_reassignment_flow() {
    let mut conn = open_db_in_memory().unwrap();
    let acme = seed_acme(&mut conn);
    let acme_id = created_id(&acme);
    let employee_id = acme["employees"][0]["id"].as_i64().unwrap();

    let globex = create_company(
        &mut conn,
        r#"{"name": "Globex", "nip": "0987654321", "address": "Oak 7",
            "city": "Cypress Creek", "postalCode": "11-111"}"#,
    );
    assert_eq!(globex.status, 201);
    let globex_id = created_id(&globex.body);

    let missing_body = update_employee_company(&mut conn, employee_id, "{}");
    assert_eq!(missing_body.status, 400);
    assert_eq!(missing_body.body, json!({ "error": "Company ID is required" }));

    let missing_company =
        update_employee_company(&mut conn, employee_id, r#"{"company_id": 999}"#);
    assert_eq!(missing_company.status, 404);
    assert_eq!(
        get_employee(&mut conn, employee_id).body["companyId"],
        json!(acme_id)
    );

    let body = format!(r#"{{"company_id": {globex_id}}}"#);
    assert_eq!(update_employee_company(&mut conn, employee_id, &body).status, 200);
    assert_eq!(update_employee_company(&mut conn, employee_id, &body).status, 304);
    assert_eq!(
        list_company_employees(&mut conn, globex_id).body[0]["id"],
        json!(employee_id)
    );
}

#[test]
fn deleting_a_company_keeps_its_employees() {
    let mut conn = open_db_in_memory().unwrap();
    let created = seed_acme(&mut conn);
    let id = created_id(&created);
    let employee_id = created["employees"][0]["id"].as_i64().unwrap();

    let response = delete_company(&mut conn, id);
    assert_eq!(response.status, 200);
    assert_eq!(
        response.body["message"],
        "Company deleted successfully; 1 employee(s) detached"
    );

    let employee = get_employee(&mut conn, employee_id);
    assert_eq!(employee.status, 200);
    assert_eq!(employee.body["companyId"], Value::Null);
    assert_eq!(delete_company(&mut conn, id).status, 404);
}

#[test]
fn standalone_employees_and_batches() {
    let mut conn = open_db_in_memory().unwrap();
    let created = create_employee(
        &mut conn,
        r#"{"firstName": "Sam", "lastName": "Roe", "email": "sam@x.com"}"#,
    );
    assert_eq!(created.status, 201);
    assert_eq!(created.body["companyId"], Value::Null);

    let orphan = create_employee(
        &mut conn,
        r#"{"firstName": "Al", "lastName": "Doe", "email": "al@x.com", "companyId": 7}"#,
    );
    assert_eq!(orphan.status, 404);

    let company_id = created_id(&seed_acme(&mut conn));
    let batch = add_company_employees(
        &mut conn,
        company_id,
        r#"[{"firstName": "Al", "lastName": "Doe", "email": "al@x.com"}]"#,
    );
    assert_eq!(batch.status, 201);
    assert_eq!(batch.body[0]["companyId"], json!(company_id));

    assert_eq!(list_employees(&mut conn).body.as_array().unwrap().len(), 3);
    assert_eq!(
        list_company_employees(&mut conn, company_id)
            .body
            .as_array()
            .unwrap()
            .len(),
        2
    );
}
