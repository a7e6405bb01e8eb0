use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{FromForm, Request};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::AppError;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ValidationResponse {
    pub status: String,
    pub errors: HashMap<String, Vec<String>>,
}

impl ValidationResponse {
    pub fn new(errors: HashMap<String, Vec<String>>) -> Self {
        Self {
            status: "error".to_string(),
            errors,
        }
    }

    pub fn with_error(field: &str, message: &str) -> Self {
        let mut errors = HashMap::new();
        errors.insert(field.to_string(), vec![message.to_string()]);
        Self::new(errors)
    }

    pub fn from_validation_errors(errors: &ValidationErrors) -> Self {
        let mut error_map = HashMap::new();

        for (field, field_errors) in errors.field_errors() {
            let error_messages: Vec<String> = field_errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .clone()
                        .unwrap_or_else(|| "Invalid value".into())
                        .to_string()
                })
                .collect();

            error_map.insert(field.to_string(), error_messages);
        }

        Self::new(error_map)
    }
}

pub trait ToValidationResponse {
    fn to_validation_response(self) -> Custom<Json<ValidationResponse>>;
}

impl ToValidationResponse for Status {
    fn to_validation_response(self) -> Custom<Json<ValidationResponse>> {
        let (field, message) = match self.code {
            403 => (
                "permission",
                "You don't have permission to perform this action",
            ),
            401 => ("authentication", "Authentication required"),
            404 => ("resource", "Resource not found"),
            400 => ("request", "Bad request"),
            422 => ("request", "Malformed request body"),
            500 => ("server", "Internal server error"),
            503 => ("service", "Service unavailable"),
            _ => ("error", "An error occurred"),
        };

        Custom(self, Json(ValidationResponse::with_error(field, message)))
    }
}

#[catch(default)]
pub fn json_catcher(status: Status, req: &Request<'_>) -> Custom<Json<ValidationResponse>> {
    tracing::warn!(status = status.code, method = %req.method(), uri = %req.uri(), "Request failed before reaching a handler");
    status.to_validation_response()
}

pub trait JsonValidateExt<T> {
    /// Unwraps the request body, running its `validator` rules first.
    fn validate_custom(self) -> Result<T, AppError>;
}

impl<T: Validate> JsonValidateExt<T> for Json<T> {
    fn validate_custom(self) -> Result<T, AppError> {
        let inner = self.into_inner();
        inner.validate()?;
        Ok(inner)
    }
}

/// Raw paging query values, parsed and range-checked by [`PageParams::resolve`].
#[derive(FromForm, Debug, Default, Clone)]
pub struct PageParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl PageParams {
    pub fn resolve(self) -> Result<Page, AppError> {
        let limit = parse_page_value("limit", self.limit.as_deref(), DEFAULT_LIMIT)?;
        let offset = parse_page_value("offset", self.offset.as_deref(), 0)?;

        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }

        if offset < 0 {
            return Err(AppError::Validation(
                "offset must not be negative".to_string(),
            ));
        }

        Ok(Page { limit, offset })
    }
}

fn parse_page_value(name: &str, raw: Option<&str>, default: i64) -> Result<i64, AppError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| AppError::Validation(format!("{} must be an integer", name))),
    }
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be blank".into());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_default_to_first_ten() {
        let page = PageParams::default().resolve().expect("defaults are valid");
        assert_eq!(page, Page { limit: 10, offset: 0 });
    }

    #[test]
    fn page_params_reject_out_of_range_values() {
        for (limit, offset) in [
            (Some("0"), None),
            (Some("101"), None),
            (None, Some("-1")),
            (Some("abc"), None),
            (None, Some("x")),
            (Some(""), None),
        ] {
            let result = PageParams {
                limit: limit.map(str::to_string),
                offset: offset.map(str::to_string),
            }
            .resolve();
            assert!(
                matches!(result, Err(AppError::Validation(_))),
                "limit={:?} offset={:?} should be rejected",
                limit,
                offset
            );
        }
    }

    #[test]
    fn page_params_parse_numeric_text() {
        let page = PageParams {
            limit: Some("25".to_string()),
            offset: Some("50".to_string()),
        }
        .resolve()
        .expect("numeric values are valid");
        assert_eq!(page, Page { limit: 25, offset: 50 });
    }

    #[test]
    fn status_codes_map_to_error_fields() {
        let response = Status::Forbidden.to_validation_response();
        assert_eq!(response.0, Status::Forbidden);
        assert!(response.1.errors.contains_key("permission"));

        let response = Status::UnprocessableEntity.to_validation_response();
        assert!(response.1.errors.contains_key("request"));

        let response = Status::ImATeapot.to_validation_response();
        assert!(response.1.errors.contains_key("error"));
    }

    #[test]
    fn not_blank_rejects_whitespace() {
        assert!(not_blank("  ").is_err());
        assert!(not_blank("Ivanov").is_ok());
    }
}
