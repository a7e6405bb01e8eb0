use std::sync::Arc;

use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument, warn};

use crate::auth::{Permission, Principal};
use crate::error::AppError;
use crate::validation::JsonValidateExt;

use super::client::{SessionRequest, TestServiceClient};
use super::db;
use super::models::{ApplicationStatus, JobApplication};
use super::schemas::{
    ApplicationCreate, ApplicationFilter, ApplicationUpdate, AssignTestRequest, TestResultPayload,
};

pub type SharedTestServiceClient = Arc<dyn TestServiceClient>;

/// Asks test-service for a session and links it to the application.
///
/// The application row is only written after test-service accepted the
/// request, so a failed call leaves it untouched.
#[instrument(skip(pool, client, application), fields(application_id = application.id))]
async fn assign_test(
    pool: &Pool<Sqlite>,
    client: &dyn TestServiceClient,
    application: &JobApplication,
    template_id: &str,
) -> Result<JobApplication, AppError> {
    let candidate = db::get_candidate(pool, application.candidate_id).await?;

    let request = SessionRequest {
        application_id: application.id,
        template_id: template_id.to_string(),
        candidate_email: candidate.email,
    };

    let session = client.create_session(&request).await.map_err(|err| match err {
        AppError::NotFound(_) => {
            AppError::NotFound(format!("Test template {} not found", template_id))
        }
        other => other,
    })?;

    info!(session_id = %session.id, "Test assigned");
    db::attach_test_session(pool, application.id, &session.id).await
}

#[post("/applications", data = "<application>")]
pub async fn create_application(
    principal: Principal,
    application: Json<ApplicationCreate>,
    pool: &State<Pool<Sqlite>>,
    client: &State<SharedTestServiceClient>,
) -> Result<Custom<Json<JobApplication>>, AppError> {
    principal.require_permission(Permission::SubmitApplications)?;
    let validated = application.validate_custom()?;

    let created = db::create_application(pool, validated.candidate_id, validated.vacancy_id).await?;

    let Some(template_id) = validated.template_id else {
        return Ok(Custom(Status::Created, Json(created)));
    };

    match assign_test(pool, client.inner().as_ref(), &created, &template_id).await {
        Ok(assigned) => Ok(Custom(Status::Created, Json(assigned))),
        Err(err) => {
            warn!(application_id = created.id, error = %err, "Test assignment failed, removing application");
            if let Err(cleanup) = db::delete_application(pool, created.id).await {
                warn!(application_id = created.id, error = %cleanup, "Failed to remove application");
            }
            Err(err)
        }
    }
}

#[get("/applications/<id>")]
pub async fn get_application(
    principal: Principal,
    id: i64,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<JobApplication>, AppError> {
    principal.require_permission(Permission::ViewApplications)?;
    Ok(Json(db::get_application(pool, id).await?))
}

#[get("/applications?<filter..>")]
pub async fn list_applications(
    principal: Principal,
    filter: ApplicationFilter,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<JobApplication>>, AppError> {
    principal.require_permission(Permission::ViewApplications)?;

    let page = filter.page().resolve()?;
    let applications =
        db::list_applications(pool, filter.candidate_id, filter.vacancy_id, page).await?;
    Ok(Json(applications))
}

#[put("/applications/<id>", data = "<update>")]
pub async fn update_application(
    principal: Principal,
    id: i64,
    update: Json<ApplicationUpdate>,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<JobApplication>, AppError> {
    principal.require_permission(Permission::ManageApplications)?;
    let validated = update.validate_custom()?;

    let status = validated
        .status
        .as_deref()
        .map(str::parse::<ApplicationStatus>)
        .transpose()?;

    Ok(Json(
        db::update_application(pool, id, status, validated.test_score).await?,
    ))
}

#[patch("/applications/<id>/status?<new_status>")]
pub async fn update_application_status(
    principal: Principal,
    id: i64,
    new_status: &str,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<JobApplication>, AppError> {
    principal.require_permission(Permission::ManageApplications)?;

    let status: ApplicationStatus = new_status.parse()?;
    if status == ApplicationStatus::New {
        return Err(AppError::Validation(
            "new_status must be one of applied, tested, hired, rejected".to_string(),
        ));
    }

    Ok(Json(db::set_application_status(pool, id, status).await?))
}

#[delete("/applications/<id>")]
pub async fn delete_application(
    principal: Principal,
    id: i64,
    pool: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    principal.require_permission(Permission::ManageApplications)?;

    if db::delete_application(pool, id).await? {
        Ok(Status::NoContent)
    } else {
        Err(AppError::NotFound(format!(
            "Application with id {} not found",
            id
        )))
    }
}

#[post("/applications/<id>/assign-test", data = "<request>")]
pub async fn assign_test_route(
    principal: Principal,
    id: i64,
    request: Json<AssignTestRequest>,
    pool: &State<Pool<Sqlite>>,
    client: &State<SharedTestServiceClient>,
) -> Result<Json<JobApplication>, AppError> {
    principal.require_permission(Permission::AssignTests)?;
    let validated = request.validate_custom()?;

    let application = db::get_application(pool, id).await?;
    let assigned = assign_test(
        pool,
        client.inner().as_ref(),
        &application,
        &validated.template_id,
    )
    .await?;

    Ok(Json(assigned))
}

#[post("/applications/<id>/test-result", data = "<result>")]
pub async fn record_test_result(
    principal: Principal,
    id: i64,
    result: Json<TestResultPayload>,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<JobApplication>, AppError> {
    principal.require_permission(Permission::ReportTestResults)?;
    let validated = result.validate_custom()?;

    info!(
        application_id = id,
        session_id = %validated.session_id,
        score = validated.score,
        reported_by = %principal.username,
        "Test result received"
    );

    Ok(Json(
        db::record_test_result(pool, id, &validated.session_id, validated.score).await?,
    ))
}
