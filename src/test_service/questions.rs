use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use sqlx::{Pool, Sqlite};

use crate::auth::{Permission, Principal};
use crate::error::AppError;
use crate::validation::JsonValidateExt;

use super::db;
use super::models::Question;
use super::schemas::{QuestionCreate, QuestionFilter, QuestionUpdate};

fn reveals_answers(principal: &Principal) -> bool {
    principal.has_permission(Permission::ManageTests)
}

#[post("/questions", data = "<question>")]
pub async fn create_question(
    principal: Principal,
    question: Json<QuestionCreate>,
    pool: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<Question>>, AppError> {
    principal.require_permission(Permission::ManageTests)?;
    let validated = question.validate_custom()?;

    let created = db::create_question(pool, &validated).await?;
    Ok(Custom(Status::Created, Json(created)))
}

#[get("/questions/<id>")]
pub async fn get_question(
    principal: Principal,
    id: &str,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<Question>, AppError> {
    principal.require_permission(Permission::ViewTests)?;

    let question = db::get_question(pool, id).await?;
    Ok(Json(question.for_viewer(reveals_answers(&principal))))
}

#[get("/questions?<filter..>")]
pub async fn list_questions(
    principal: Principal,
    filter: QuestionFilter,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Question>>, AppError> {
    principal.require_permission(Permission::ViewTests)?;

    let page = filter.page().resolve()?;
    let reveal = reveals_answers(&principal);
    let questions = db::list_questions(pool, filter.template_id.as_deref(), page)
        .await?
        .into_iter()
        .map(|question| question.for_viewer(reveal))
        .collect();

    Ok(Json(questions))
}

#[put("/questions/<id>", data = "<update>")]
pub async fn update_question(
    principal: Principal,
    id: &str,
    update: Json<QuestionUpdate>,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<Question>, AppError> {
    principal.require_permission(Permission::ManageTests)?;
    let validated = update.validate_custom()?;

    Ok(Json(db::update_question(pool, id, &validated).await?))
}

#[delete("/questions/<id>")]
pub async fn delete_question(
    principal: Principal,
    id: &str,
    pool: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    principal.require_permission(Permission::ManageTests)?;

    if db::delete_question(pool, id).await? {
        Ok(Status::NoContent)
    } else {
        Err(AppError::NotFound(format!("Question {} not found", id)))
    }
}
