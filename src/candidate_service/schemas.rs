use rocket::FromForm;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::validation::{PageParams, not_blank};

use super::models::ApplicationStatus;

fn valid_role(role: &str) -> Result<(), ValidationError> {
    match role {
        "user" | "admin" => Ok(()),
        _ => {
            let mut error = ValidationError::new("role");
            error.message = Some("role must be 'user' or 'admin'".into());
            Err(error)
        }
    }
}

fn valid_application_status(status: &str) -> Result<(), ValidationError> {
    status.parse::<ApplicationStatus>().map(|_| ()).map_err(|_| {
        let mut error = ValidationError::new("status");
        error.message = Some("status must be one of new, applied, tested, hired, rejected".into());
        error
    })
}

fn default_role() -> String {
    "user".to_string()
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct UserRegistrationRequest {
    #[validate(length(min = 3, max = 50, message = "username must be 3 to 50 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[serde(default = "default_role")]
    #[validate(custom(function = "valid_role"))]
    pub role: String,
}

#[derive(FromForm)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct CandidateCreate {
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub last_name: String,
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(length(max = 100))]
    pub middle_name: Option<String>,
    #[validate(email(message = "email must be a valid address"), length(max = 255))]
    pub email: String,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone, Default)]
pub struct CandidateUpdate {
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub last_name: Option<String>,
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub middle_name: Option<String>,
    #[validate(email(message = "email must be a valid address"), length(max = 255))]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct VacancyCreate {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone, Default)]
pub struct VacancyUpdate {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct ApplicationCreate {
    #[validate(range(min = 1, message = "candidate_id must be positive"))]
    pub candidate_id: i64,
    #[validate(range(min = 1, message = "vacancy_id must be positive"))]
    pub vacancy_id: i64,
    /// Assigns this test template right after the application is stored.
    pub template_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone, Default)]
pub struct ApplicationUpdate {
    #[validate(custom(function = "valid_application_status"))]
    pub status: Option<String>,
    #[validate(range(min = 0, max = 100, message = "test_score must be between 0 and 100"))]
    pub test_score: Option<i64>,
}

#[derive(FromForm, Debug, Default, Clone)]
pub struct ApplicationFilter {
    pub candidate_id: Option<i64>,
    pub vacancy_id: Option<i64>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ApplicationFilter {
    pub fn page(&self) -> PageParams {
        PageParams {
            limit: self.limit.clone(),
            offset: self.offset.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct AssignTestRequest {
    #[validate(custom(function = "not_blank"))]
    pub template_id: String,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct TestResultPayload {
    #[validate(custom(function = "not_blank"))]
    pub session_id: String,
    #[validate(range(min = 0, max = 100, message = "score must be between 0 and 100"))]
    pub score: i64,
}
