use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::auth::Role;
use crate::database::to_utc;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbUser {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub created_at: Option<NaiveDateTime>,
}

impl TryFrom<DbUser> for User {
    type Error = AppError;

    fn try_from(user: DbUser) -> Result<Self, Self::Error> {
        let role = user.role.unwrap_or_default();
        Ok(Self {
            id: user.id.unwrap_or_default(),
            username: user.username.unwrap_or_default(),
            role: role
                .parse()
                .map_err(|e| AppError::Internal(format!("Stored role is invalid: {}", e)))?,
            is_active: user.is_active.unwrap_or(true),
            created_at: to_utc(user.created_at),
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Candidate {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbCandidate {
    pub id: Option<i64>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl From<DbCandidate> for Candidate {
    fn from(candidate: DbCandidate) -> Self {
        Self {
            id: candidate.id.unwrap_or_default(),
            last_name: candidate.last_name.unwrap_or_default(),
            first_name: candidate.first_name.unwrap_or_default(),
            middle_name: candidate.middle_name,
            email: candidate.email.unwrap_or_default(),
            phone: candidate.phone,
            status: candidate.status.unwrap_or_else(|| "new".to_string()),
            created_at: to_utc(candidate.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Vacancy {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbVacancy {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl From<DbVacancy> for Vacancy {
    fn from(vacancy: DbVacancy) -> Self {
        Self {
            id: vacancy.id.unwrap_or_default(),
            title: vacancy.title.unwrap_or_default(),
            description: vacancy.description,
            created_at: to_utc(vacancy.created_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    New,
    Applied,
    Tested,
    Hired,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::New => "new",
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Tested => "tested",
            ApplicationStatus::Hired => "hired",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(ApplicationStatus::New),
            "applied" => Ok(ApplicationStatus::Applied),
            "tested" => Ok(ApplicationStatus::Tested),
            "hired" => Ok(ApplicationStatus::Hired),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(AppError::Validation(format!(
                "Unknown application status: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JobApplication {
    pub id: i64,
    pub candidate_id: i64,
    pub vacancy_id: i64,
    pub status: ApplicationStatus,
    pub test_session_id: Option<String>,
    pub test_score: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbJobApplication {
    pub id: Option<i64>,
    pub candidate_id: Option<i64>,
    pub vacancy_id: Option<i64>,
    pub status: Option<String>,
    pub test_session_id: Option<String>,
    pub test_score: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl TryFrom<DbJobApplication> for JobApplication {
    type Error = AppError;

    fn try_from(db: DbJobApplication) -> Result<Self, Self::Error> {
        let status = match db.status {
            Some(status) => status.parse()?,
            None => ApplicationStatus::New,
        };

        Ok(Self {
            id: db.id.unwrap_or_default(),
            candidate_id: db.candidate_id.unwrap_or_default(),
            vacancy_id: db.vacancy_id.unwrap_or_default(),
            status,
            test_session_id: db.test_session_id,
            test_score: db.test_score,
            created_at: to_utc(db.created_at),
            updated_at: to_utc(db.updated_at),
        })
    }
}
