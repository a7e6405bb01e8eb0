use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use sqlx::{Pool, Sqlite};

use crate::auth::{Permission, Principal};
use crate::error::AppError;
use crate::validation::{JsonValidateExt, PageParams};

use super::db;
use super::models::Vacancy;
use super::schemas::{VacancyCreate, VacancyUpdate};

#[post("/vacancies", data = "<vacancy>")]
pub async fn create_vacancy(
    principal: Principal,
    vacancy: Json<VacancyCreate>,
    pool: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<Vacancy>>, AppError> {
    principal.require_permission(Permission::ManageVacancies)?;
    let validated = vacancy.validate_custom()?;

    let created = db::create_vacancy(pool, &validated).await?;
    Ok(Custom(Status::Created, Json(created)))
}

#[get("/vacancies/<id>")]
pub async fn get_vacancy(
    principal: Principal,
    id: i64,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<Vacancy>, AppError> {
    principal.require_permission(Permission::ViewVacancies)?;
    Ok(Json(db::get_vacancy(pool, id).await?))
}

#[get("/vacancies?<page..>")]
pub async fn list_vacancies(
    principal: Principal,
    page: PageParams,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Vacancy>>, AppError> {
    principal.require_permission(Permission::ViewVacancies)?;
    Ok(Json(db::list_vacancies(pool, page.resolve()?).await?))
}

#[put("/vacancies/<id>", data = "<update>")]
pub async fn update_vacancy(
    principal: Principal,
    id: i64,
    update: Json<VacancyUpdate>,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<Vacancy>, AppError> {
    principal.require_permission(Permission::ManageVacancies)?;
    let validated = update.validate_custom()?;

    Ok(Json(db::update_vacancy(pool, id, &validated).await?))
}

#[delete("/vacancies/<id>")]
pub async fn delete_vacancy(
    principal: Principal,
    id: i64,
    pool: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    principal.require_permission(Permission::ManageVacancies)?;

    if db::delete_vacancy(pool, id).await? {
        Ok(Status::NoContent)
    } else {
        Err(AppError::NotFound(format!("Vacancy with id {} not found", id)))
    }
}
