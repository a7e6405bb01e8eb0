use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use sqlx::{Pool, Sqlite};

use crate::auth::{Permission, Principal};
use crate::error::AppError;
use crate::validation::{JsonValidateExt, PageParams};

use super::db;
use super::models::Candidate;
use super::schemas::{CandidateCreate, CandidateUpdate};

#[post("/candidates", data = "<candidate>")]
pub async fn create_candidate(
    principal: Principal,
    candidate: Json<CandidateCreate>,
    pool: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<Candidate>>, AppError> {
    principal.require_permission(Permission::CreateCandidates)?;
    let validated = candidate.validate_custom()?;

    let created = db::create_candidate(pool, &validated).await?;
    Ok(Custom(Status::Created, Json(created)))
}

#[get("/candidates/<id>")]
pub async fn get_candidate(
    principal: Principal,
    id: i64,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<Candidate>, AppError> {
    principal.require_permission(Permission::ManageCandidates)?;
    Ok(Json(db::get_candidate(pool, id).await?))
}

#[get("/candidates?<page..>")]
pub async fn list_candidates(
    principal: Principal,
    page: PageParams,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Candidate>>, AppError> {
    principal.require_permission(Permission::ManageCandidates)?;
    Ok(Json(db::list_candidates(pool, page.resolve()?).await?))
}

#[put("/candidates/<id>", data = "<update>")]
pub async fn update_candidate(
    principal: Principal,
    id: i64,
    update: Json<CandidateUpdate>,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<Candidate>, AppError> {
    principal.require_permission(Permission::ManageCandidates)?;
    let validated = update.validate_custom()?;

    Ok(Json(db::update_candidate(pool, id, &validated).await?))
}

#[delete("/candidates/<id>")]
pub async fn delete_candidate(
    principal: Principal,
    id: i64,
    pool: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    principal.require_permission(Permission::ManageCandidates)?;

    if db::delete_candidate(pool, id).await? {
        Ok(Status::NoContent)
    } else {
        Err(AppError::NotFound(format!("Candidate with id {} not found", id)))
    }
}
