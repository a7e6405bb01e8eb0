use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::database::{to_utc, to_utc_opt};
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TestTemplate {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbTestTemplate {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl From<DbTestTemplate> for TestTemplate {
    fn from(template: DbTestTemplate) -> Self {
        Self {
            id: template.id.unwrap_or_default(),
            title: template.title.unwrap_or_default(),
            description: template.description,
            created_at: to_utc(template.created_at),
            updated_at: to_utc(template.updated_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnswerOption {
    pub id: String,
    pub question_id: String,
    pub sequence: i64,
    pub text: String,
    /// Only present for callers allowed to manage tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnswerOption {
    /// Drops the correctness flag unless `reveal` is set.
    pub fn for_viewer(mut self, reveal: bool) -> Self {
        if !reveal {
            self.is_correct = None;
        }
        self
    }

    pub fn is_correct(&self) -> bool {
        self.is_correct.unwrap_or(false)
    }
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbAnswerOption {
    pub id: Option<String>,
    pub question_id: Option<String>,
    pub sequence: Option<i64>,
    pub text: Option<String>,
    pub is_correct: Option<bool>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl From<DbAnswerOption> for AnswerOption {
    fn from(option: DbAnswerOption) -> Self {
        Self {
            id: option.id.unwrap_or_default(),
            question_id: option.question_id.unwrap_or_default(),
            sequence: option.sequence.unwrap_or_default(),
            text: option.text.unwrap_or_default(),
            is_correct: Some(option.is_correct.unwrap_or(false)),
            created_at: to_utc(option.created_at),
            updated_at: to_utc(option.updated_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Question {
    pub id: String,
    pub template_id: String,
    pub sequence: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub answer_options: Vec<AnswerOption>,
}

impl Question {
    pub fn for_viewer(mut self, reveal: bool) -> Self {
        self.answer_options = self
            .answer_options
            .into_iter()
            .map(|option| option.for_viewer(reveal))
            .collect();
        self
    }
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbQuestion {
    pub id: Option<String>,
    pub template_id: Option<String>,
    pub sequence: Option<i64>,
    pub text: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl From<DbQuestion> for Question {
    fn from(question: DbQuestion) -> Self {
        Self {
            id: question.id.unwrap_or_default(),
            template_id: question.template_id.unwrap_or_default(),
            sequence: question.sequence.unwrap_or_default(),
            text: question.text.unwrap_or_default(),
            created_at: to_utc(question.created_at),
            updated_at: to_utc(question.updated_at),
            answer_options: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Created,
    InProgress,
    Scored,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Created => "created",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Scored => "scored",
        }
    }
}

impl FromStr for SessionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(SessionStatus::Created),
            "in_progress" => Ok(SessionStatus::InProgress),
            "scored" => Ok(SessionStatus::Scored),
            _ => Err(AppError::Internal(format!("Unknown session status: {}", s))),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TestSession {
    pub id: String,
    pub application_id: i64,
    pub template_id: String,
    pub candidate_email: String,
    pub token: String,
    pub status: SessionStatus,
    pub score: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbTestSession {
    pub id: Option<String>,
    pub template_id: Option<String>,
    pub application_id: Option<i64>,
    pub candidate_email: Option<String>,
    pub token: Option<String>,
    pub status: Option<String>,
    pub score: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
}

impl TryFrom<DbTestSession> for TestSession {
    type Error = AppError;

    fn try_from(db: DbTestSession) -> Result<Self, Self::Error> {
        let status = match db.status {
            Some(status) => status.parse()?,
            None => SessionStatus::Created,
        };

        Ok(Self {
            id: db.id.unwrap_or_default(),
            application_id: db.application_id.unwrap_or_default(),
            template_id: db.template_id.unwrap_or_default(),
            candidate_email: db.candidate_email.unwrap_or_default(),
            token: db.token.unwrap_or_default(),
            status,
            score: db.score,
            created_at: to_utc(db.created_at),
            started_at: to_utc_opt(db.started_at),
            completed_at: to_utc_opt(db.completed_at),
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionAnswer {
    pub id: String,
    pub session_id: String,
    pub question_id: String,
    pub answer_id: String,
    pub answered_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbSessionAnswer {
    pub id: Option<String>,
    pub session_id: Option<String>,
    pub question_id: Option<String>,
    pub answer_id: Option<String>,
    pub answered_at: Option<NaiveDateTime>,
}

impl From<DbSessionAnswer> for SessionAnswer {
    fn from(answer: DbSessionAnswer) -> Self {
        Self {
            id: answer.id.unwrap_or_default(),
            session_id: answer.session_id.unwrap_or_default(),
            question_id: answer.question_id.unwrap_or_default(),
            answer_id: answer.answer_id.unwrap_or_default(),
            answered_at: to_utc(answer.answered_at),
        }
    }
}
