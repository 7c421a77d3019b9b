//! `/api/company` routes.
//!
//! Each function takes the already-extracted path id and raw body, runs one
//! request-scoped `CompanyService`, and never panics.

use crate::response::{finish, parse_body, ApiResponse, STATUS_CREATED, STATUS_OK};
use firmbook_core::{
    Company, CompanyId, CompanyInput, CompanyService, CompanyWithEmployees, Employee,
    EmployeeInput, EmployeeService, ServiceResult,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/company`: company fields plus optional employees.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCompanyRequest {
    #[serde(flatten)]
    pub company: CompanyInput,
    #[serde(default)]
    pub employees: Vec<EmployeeInput>,
}

#[derive(Serialize)]
struct CompanyBody<'a> {
    #[serde(flatten)]
    company: &'a Company,
    employees: &'a [Employee],
}

impl<'a> From<&'a CompanyWithEmployees> for CompanyBody<'a> {
    fn from(created: &'a CompanyWithEmployees) -> Self {
        Self {
            company: &created.company,
            employees: &created.employees,
        }
    }
}

/// `POST /api/company`: 201 with the created company and its employees.
pub fn create_company(conn: &mut Connection, body: &str) -> ApiResponse {
    let response = match parse_body::<CreateCompanyRequest>(body) {
        Ok(request) => with_company_service(conn, |service| {
            service.create_company(&request.company, &request.employees)
        })
        .map(|created| ApiResponse::json(STATUS_CREATED, &CompanyBody::from(&created)))
        .unwrap_or_else(ApiResponse::from),
        Err(response) => response,
    };
    finish("create_company", response)
}

/// `GET /api/company`.
pub fn list_companies(conn: &mut Connection) -> ApiResponse {
    let response = with_company_service(conn, |service| service.list_companies())
        .map(|companies| ApiResponse::json(STATUS_OK, &companies))
        .unwrap_or_else(ApiResponse::from);
    finish("list_companies", response)
}

/// `GET /api/company/{id}`.
pub fn get_company(conn: &mut Connection, id: CompanyId) -> ApiResponse {
    let response = with_company_service(conn, |service| service.get_company(id))
        .map(|company| ApiResponse::json(STATUS_OK, &company))
        .unwrap_or_else(ApiResponse::from);
    finish("get_company", response)
}

/// `PUT /api/company/{id}`: 200 when written, 304 when nothing changed.
pub fn update_company(conn: &mut Connection, id: CompanyId, body: &str) -> ApiResponse {
    let response = match parse_body::<CompanyInput>(body) {
        Ok(input) => with_company_service(conn, |service| service.update_company(id, &input))
            .map(|changed| ApiResponse::updated(changed, "Company updated successfully"))
            .unwrap_or_else(ApiResponse::from),
        Err(response) => response,
    };
    finish("update_company", response)
}

/// `DELETE /api/company/{id}`: employees are detached, not deleted.
pub fn delete_company(conn: &mut Connection, id: CompanyId) -> ApiResponse {
    let response = with_company_service(conn, |service| service.delete_company(id))
        .map(|detached| {
            ApiResponse::message(
                STATUS_OK,
                format!("Company deleted successfully; {detached} employee(s) detached"),
            )
        })
        .unwrap_or_else(ApiResponse::from);
    finish("delete_company", response)
}

/// `GET /api/company/{id}/employees`.
pub fn list_company_employees(conn: &mut Connection, id: CompanyId) -> ApiResponse {
    let response = with_company_service(conn, |service| service.list_company_employees(id))
        .map(|employees| ApiResponse::json(STATUS_OK, &employees))
        .unwrap_or_else(ApiResponse::from);
    finish("list_company_employees", response)
}

/// `POST /api/company/{id}/employees`: body is a JSON array of employees.
pub fn add_company_employees(conn: &mut Connection, id: CompanyId, body: &str) -> ApiResponse {
    let response = match parse_body::<Vec<EmployeeInput>>(body) {
        Ok(inputs) => EmployeeService::try_new(conn)
            .and_then(|mut service| service.add_employees_to_company(id, &inputs))
            .map(|employees| ApiResponse::json(STATUS_CREATED, &employees))
            .unwrap_or_else(ApiResponse::from),
        Err(response) => response,
    };
    finish("add_company_employees", response)
}

fn with_company_service<T>(
    conn: &mut Connection,
    f: impl FnOnce(&mut CompanyService<'_>) -> ServiceResult<T>,
) -> ServiceResult<T> {
    let mut service = CompanyService::try_new(conn)?;
    f(&mut service)
}
