use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use sqlx::{Pool, Sqlite};

use crate::auth::{Permission, Principal};
use crate::error::AppError;
use crate::validation::JsonValidateExt;

use super::db;
use super::models::AnswerOption;
use super::schemas::{AnswerOptionCreate, AnswerOptionFilter, AnswerOptionUpdate};

#[post("/answers", data = "<option>")]
pub async fn create_answer_option(
    principal: Principal,
    option: Json<AnswerOptionCreate>,
    pool: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<AnswerOption>>, AppError> {
    principal.require_permission(Permission::ManageTests)?;
    let validated = option.validate_custom()?;

    let created = db::create_answer_option(pool, &validated).await?;
    Ok(Custom(Status::Created, Json(created)))
}

#[get("/answers/<id>")]
pub async fn get_answer_option(
    principal: Principal,
    id: &str,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<AnswerOption>, AppError> {
    principal.require_permission(Permission::ViewTests)?;

    let option = db::get_answer_option(pool, id).await?;
    Ok(Json(
        option.for_viewer(principal.has_permission(Permission::ManageTests)),
    ))
}

#[get("/answers?<filter..>")]
pub async fn list_answer_options(
    principal: Principal,
    filter: AnswerOptionFilter,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<AnswerOption>>, AppError> {
    principal.require_permission(Permission::ViewTests)?;

    let page = filter.page().resolve()?;
    let reveal = principal.has_permission(Permission::ManageTests);
    let options = db::list_answer_options(pool, filter.question_id.as_deref(), page)
        .await?
        .into_iter()
        .map(|option| option.for_viewer(reveal))
        .collect();

    Ok(Json(options))
}

#[put("/answers/<id>", data = "<update>")]
pub async fn update_answer_option(
    principal: Principal,
    id: &str,
    update: Json<AnswerOptionUpdate>,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<AnswerOption>, AppError> {
    principal.require_permission(Permission::ManageTests)?;
    let validated = update.validate_custom()?;

    Ok(Json(db::update_answer_option(pool, id, &validated).await?))
}

#[delete("/answers/<id>")]
pub async fn delete_answer_option(
    principal: Principal,
    id: &str,
    pool: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    principal.require_permission(Permission::ManageTests)?;

    if db::delete_answer_option(pool, id).await? {
        Ok(Status::NoContent)
    } else {
        Err(AppError::NotFound(format!("Answer option {} not found", id)))
    }
}
