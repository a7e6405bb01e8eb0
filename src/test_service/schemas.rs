use rocket::FromForm;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{PageParams, not_blank};

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct TemplateCreate {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone, Default)]
pub struct TemplateUpdate {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct QuestionCreate {
    #[validate(custom(function = "not_blank"))]
    pub template_id: String,
    #[validate(range(min = 1, message = "sequence must be at least 1"))]
    pub sequence: i64,
    #[validate(custom(function = "not_blank"))]
    pub text: String,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone, Default)]
pub struct QuestionUpdate {
    #[validate(range(min = 1, message = "sequence must be at least 1"))]
    pub sequence: Option<i64>,
    #[validate(custom(function = "not_blank"))]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct AnswerOptionCreate {
    #[validate(custom(function = "not_blank"))]
    pub question_id: String,
    /// Appended after the question's last option when omitted.
    #[validate(range(min = 1, message = "sequence must be at least 1"))]
    pub sequence: Option<i64>,
    #[validate(custom(function = "not_blank"))]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone, Default)]
pub struct AnswerOptionUpdate {
    #[validate(range(min = 1, message = "sequence must be at least 1"))]
    pub sequence: Option<i64>,
    #[validate(custom(function = "not_blank"))]
    pub text: Option<String>,
    pub is_correct: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct SessionCreate {
    #[validate(range(min = 1, message = "application_id must be positive"))]
    pub application_id: i64,
    #[validate(custom(function = "not_blank"))]
    pub template_id: String,
    #[validate(email(message = "candidate_email must be a valid address"))]
    pub candidate_email: String,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct SessionAnswerCreate {
    #[validate(custom(function = "not_blank"))]
    pub question_id: String,
    #[validate(custom(function = "not_blank"))]
    pub answer_id: String,
}

#[derive(FromForm, Debug, Default, Clone)]
pub struct QuestionFilter {
    pub template_id: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(FromForm, Debug, Default, Clone)]
pub struct AnswerOptionFilter {
    pub question_id: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(FromForm, Debug, Default, Clone)]
pub struct SessionFilter {
    pub candidate_email: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

macro_rules! impl_page {
    ($($filter:ty),+) => {
        $(impl $filter {
            pub fn page(&self) -> PageParams {
                PageParams {
                    limit: self.limit.clone(),
                    offset: self.offset.clone(),
                }
            }
        })+
    };
}

impl_page!(QuestionFilter, AnswerOptionFilter, SessionFilter);
