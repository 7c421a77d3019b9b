//! Response envelope and error-to-status mapping.

use firmbook_core::{RepoError, ServiceError};
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_NOT_MODIFIED: u16 = 304;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

pub(crate) const NO_CHANGES_MESSAGE: &str = "No changes detected";

/// Status code plus JSON body, as an HTTP adapter would send it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// Serializes `payload` as the body; serialization failure answers 500.
    pub fn json<T: Serialize>(status: u16, payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(body) => Self { status, body },
            Err(err) => Self::error(
                STATUS_INTERNAL_ERROR,
                format!("failed to encode response: {err}"),
            ),
        }
    }

    /// `{"message": ...}` body for actions.
    pub fn message(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "message": message.into() }),
        }
    }

    /// `{"error": ...}` body for failures.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    /// 200 with `changed_message`, or 304 when nothing was written.
    pub fn updated(changed: bool, changed_message: &str) -> Self {
        if changed {
            Self::message(STATUS_OK, changed_message)
        } else {
            Self::message(STATUS_NOT_MODIFIED, NO_CHANGES_MESSAGE)
        }
    }

    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }
}

impl From<ServiceError> for ApiResponse {
    fn from(err: ServiceError) -> Self {
        match &err {
            ServiceError::Validation(errors) => Self {
                status: STATUS_BAD_REQUEST,
                body: json!({
                    "error": err.to_string(),
                    "fields": errors.errors(),
                }),
            },
            ServiceError::NotFound(_) => Self::error(STATUS_NOT_FOUND, err.to_string()),
            ServiceError::Persistence(RepoError::ConstraintViolation(_)) => {
                Self::error(STATUS_CONFLICT, err.to_string())
            }
            ServiceError::Persistence(_) => Self::error(STATUS_INTERNAL_ERROR, err.to_string()),
        }
    }
}

/// Parses a request body, answering 400 on malformed JSON.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiResponse> {
    serde_json::from_str(body)
        .map_err(|err| ApiResponse::error(STATUS_BAD_REQUEST, format!("invalid JSON body: {err}")))
}

/// Logs the outcome of one route call and hands the response back.
pub(crate) fn finish(route: &'static str, response: ApiResponse) -> ApiResponse {
    match response.status {
        status if status >= STATUS_INTERNAL_ERROR => error!(
            "event=api_request module=api status=error route={} http_status={}",
            route, status
        ),
        status if status >= STATUS_BAD_REQUEST => warn!(
            "event=api_request module=api status=error route={} http_status={}",
            route, status
        ),
        status => info!(
            "event=api_request module=api status=ok route={} http_status={}",
            route, status
        ),
    }
    response
}

#[cfg(test)]
mod tests {
    use super::{parse_body, ApiResponse, STATUS_BAD_REQUEST, STATUS_CONFLICT, STATUS_NOT_FOUND};
    use firmbook_core::{EntityKey, RepoError, ServiceError, ValidationErrors};
    use serde_json::{json, Value};

    #[test]
    fn validation_errors_list_every_field() {
        let response = ApiResponse::from(ServiceError::Validation(ValidationErrors::single(
            "nip",
            "field is required and cannot be empty",
        )));
        assert_eq!(response.status, STATUS_BAD_REQUEST);
        assert_eq!(response.body["fields"][0]["field"], "nip");
    }

    #[test]
    fn not_found_and_conflict_map_to_their_codes() {
        let not_found = ApiResponse::from(ServiceError::NotFound(EntityKey::company(3)));
        assert_eq!(not_found.status, STATUS_NOT_FOUND);
        assert_eq!(
            not_found.body,
            json!({ "error": "company with id 3 not found" })
        );

        let conflict = ApiResponse::from(ServiceError::Persistence(
            RepoError::ConstraintViolation("UNIQUE constraint failed".to_string()),
        ));
        assert_eq!(conflict.status, STATUS_CONFLICT);
    }

    #[test]
    fn unchanged_update_answers_not_modified() {
        let response = ApiResponse::updated(false, "Company updated successfully");
        assert_eq!(response.status, 304);
        assert_eq!(response.body["message"], "No changes detected");
        assert!(response.is_success());
    }

    #[test]
    fn malformed_body_is_a_bad_request() {
        let err = parse_body::<Value>("{not json").unwrap_err();
        assert_eq!(err.status, STATUS_BAD_REQUEST);
        assert!(err.body["error"]
            .as_str()
            .unwrap()
            .starts_with("invalid JSON body"));
    }
}
