use std::sync::Arc;

use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::auth::{Permission, Principal};
use crate::error::AppError;
use crate::validation::{JsonValidateExt, PageParams};

use super::client::{CandidateServiceClient, TestResult};
use super::db;
use super::models::{SessionAnswer, TestSession};
use super::schemas::{SessionAnswerCreate, SessionCreate, SessionFilter};

pub type SharedCandidateServiceClient = Arc<dyn CandidateServiceClient>;

#[post("/sessions", data = "<session>")]
pub async fn create_session(
    principal: Principal,
    session: Json<SessionCreate>,
    pool: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<TestSession>>, AppError> {
    principal.require_permission(Permission::ManageSessions)?;
    let validated = session.validate_custom()?;

    let created = db::create_session(pool, &validated).await?;
    info!(
        session_id = %created.id,
        application_id = created.application_id,
        requested_by = %principal.username,
        "Test session opened"
    );

    Ok(Custom(Status::Created, Json(created)))
}

#[get("/sessions/<id>")]
pub async fn get_session(
    principal: Principal,
    id: &str,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<TestSession>, AppError> {
    principal.require_permission(Permission::ViewTests)?;
    Ok(Json(db::get_session(pool, id).await?))
}

#[get("/sessions?<filter..>")]
pub async fn list_sessions(
    principal: Principal,
    filter: SessionFilter,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<TestSession>>, AppError> {
    principal.require_permission(Permission::ViewTests)?;

    let page = filter.page().resolve()?;
    Ok(Json(
        db::list_sessions(pool, filter.candidate_email.as_deref(), page).await?,
    ))
}

#[patch("/sessions/<id>/score?<score>")]
pub async fn update_session_score(
    principal: Principal,
    id: &str,
    score: i64,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<TestSession>, AppError> {
    principal.require_permission(Permission::ManageSessions)?;

    if !(0..=100).contains(&score) {
        return Err(AppError::Validation(
            "score must be between 0 and 100".to_string(),
        ));
    }

    Ok(Json(db::set_session_score(pool, id, score).await?))
}

#[delete("/sessions/<id>")]
pub async fn delete_session(
    principal: Principal,
    id: &str,
    pool: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    principal.require_permission(Permission::ManageSessions)?;

    if db::delete_session(pool, id).await? {
        Ok(Status::NoContent)
    } else {
        Err(AppError::NotFound(format!("Test session {} not found", id)))
    }
}

#[post("/sessions/<id>/answers", data = "<answer>")]
pub async fn submit_answer(
    principal: Principal,
    id: &str,
    answer: Json<SessionAnswerCreate>,
    pool: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<SessionAnswer>>, AppError> {
    principal.require_permission(Permission::TakeTests)?;
    let validated = answer.validate_custom()?;

    let created = db::submit_answer(pool, id, &validated).await?;
    Ok(Custom(Status::Created, Json(created)))
}

#[get("/sessions/<id>/answers?<page..>")]
pub async fn list_session_answers(
    principal: Principal,
    id: &str,
    page: PageParams,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<SessionAnswer>>, AppError> {
    principal.require_permission(Permission::ViewTests)?;
    Ok(Json(
        db::list_session_answers(pool, id, page.resolve()?).await?,
    ))
}

/// Scores the session, then reports the score to candidate-service.
///
/// The score is stored before the report is sent, so a failed report can be
/// retried by finishing the session again.
#[post("/sessions/<id>/finish")]
pub async fn finish_session(
    principal: Principal,
    id: &str,
    pool: &State<Pool<Sqlite>>,
    candidate_service: &State<SharedCandidateServiceClient>,
) -> Result<Json<TestSession>, AppError> {
    principal.require_permission(Permission::TakeTests)?;

    let session = db::finish_session(pool, id).await?;
    let result = TestResult {
        session_id: session.id.clone(),
        score: session.score.unwrap_or(0),
    };

    candidate_service
        .report_test_result(session.application_id, &result)
        .await?;

    info!(session_id = %session.id, score = result.score, "Test result reported");
    Ok(Json(session))
}
