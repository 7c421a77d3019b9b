//! `/api/employee` routes.

use crate::response::{
    finish, parse_body, ApiResponse, STATUS_BAD_REQUEST, STATUS_CREATED, STATUS_OK,
};
use firmbook_core::{CompanyId, EmployeeId, EmployeeInput, EmployeeService, ServiceResult};
use rusqlite::Connection;
use serde::Deserialize;

/// Body of `POST /api/employee`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    #[serde(flatten)]
    pub employee: EmployeeInput,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
}

/// Body of `PUT /api/employee/{id}/update-company`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEmployeeCompanyRequest {
    #[serde(default)]
    pub company_id: Option<CompanyId>,
}

/// `POST /api/employee`: 201 with the created employee.
pub fn create_employee(conn: &mut Connection, body: &str) -> ApiResponse {
    let response = match parse_body::<CreateEmployeeRequest>(body) {
        Ok(request) => with_employee_service(conn, |service| {
            service.create_employee(&request.employee, request.company_id)
        })
        .map(|employee| ApiResponse::json(STATUS_CREATED, &employee))
        .unwrap_or_else(ApiResponse::from),
        Err(response) => response,
    };
    finish("create_employee", response)
}

/// `GET /api/employee`.
pub fn list_employees(conn: &mut Connection) -> ApiResponse {
    let response = with_employee_service(conn, |service| service.list_employees())
        .map(|employees| ApiResponse::json(STATUS_OK, &employees))
        .unwrap_or_else(ApiResponse::from);
    finish("list_employees", response)
}

/// `GET /api/employee/{id}`.
pub fn get_employee(conn: &mut Connection, id: EmployeeId) -> ApiResponse {
    let response = with_employee_service(conn, |service| service.get_employee(id))
        .map(|employee| ApiResponse::json(STATUS_OK, &employee))
        .unwrap_or_else(ApiResponse::from);
    finish("get_employee", response)
}

/// `PUT /api/employee/{id}`: 200 when written, 304 when nothing changed.
///
/// A present but malformed email is rejected with 400.
pub fn update_employee(conn: &mut Connection, id: EmployeeId, body: &str) -> ApiResponse {
    let response = match parse_body::<EmployeeInput>(body) {
        Ok(input) => with_employee_service(conn, |service| service.update_employee(id, &input))
            .map(|changed| ApiResponse::updated(changed, "Employee updated successfully"))
            .unwrap_or_else(ApiResponse::from),
        Err(response) => response,
    };
    finish("update_employee", response)
}

/// `DELETE /api/employee/{id}`.
pub fn delete_employee(conn: &mut Connection, id: EmployeeId) -> ApiResponse {
    let response = with_employee_service(conn, |service| service.delete_employee(id))
        .map(|()| ApiResponse::message(STATUS_OK, "Employee deleted successfully"))
        .unwrap_or_else(ApiResponse::from);
    finish("delete_employee", response)
}

/// `PUT /api/employee/{id}/update-company` with body `{"company_id": n}`.
pub fn update_employee_company(conn: &mut Connection, id: EmployeeId, body: &str) -> ApiResponse {
    let response = match parse_body::<UpdateEmployeeCompanyRequest>(body) {
        Ok(UpdateEmployeeCompanyRequest {
            company_id: Some(company_id),
        }) => with_employee_service(conn, |service| service.assign_company(id, company_id))
            .map(|changed| {
                ApiResponse::updated(changed, "Employee's company updated successfully")
            })
            .unwrap_or_else(ApiResponse::from),
        Ok(UpdateEmployeeCompanyRequest { company_id: None }) => {
            ApiResponse::error(STATUS_BAD_REQUEST, "Company ID is required")
        }
        Err(response) => response,
    };
    finish("update_employee_company", response)
}

fn with_employee_service<T>(
    conn: &mut Connection,
    f: impl FnOnce(&mut EmployeeService<'_>) -> ServiceResult<T>,
) -> ServiceResult<T> {
    let mut service = EmployeeService::try_new(conn)?;
    f(&mut service)
}
