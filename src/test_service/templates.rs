use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use sqlx::{Pool, Sqlite};

use crate::auth::{Permission, Principal};
use crate::error::AppError;
use crate::validation::{JsonValidateExt, PageParams};

use super::db;
use super::models::TestTemplate;
use super::schemas::{TemplateCreate, TemplateUpdate};

#[post("/templates", data = "<template>")]
pub async fn create_template(
    principal: Principal,
    template: Json<TemplateCreate>,
    pool: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<TestTemplate>>, AppError> {
    principal.require_permission(Permission::ManageTests)?;
    let validated = template.validate_custom()?;

    let created = db::create_template(pool, &validated).await?;
    Ok(Custom(Status::Created, Json(created)))
}

#[get("/templates/<id>")]
pub async fn get_template(
    principal: Principal,
    id: &str,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<TestTemplate>, AppError> {
    principal.require_permission(Permission::ViewTests)?;
    Ok(Json(db::get_template(pool, id).await?))
}

#[get("/templates?<page..>")]
pub async fn list_templates(
    principal: Principal,
    page: PageParams,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<TestTemplate>>, AppError> {
    principal.require_permission(Permission::ViewTests)?;
    Ok(Json(db::list_templates(pool, page.resolve()?).await?))
}

#[put("/templates/<id>", data = "<update>")]
pub async fn update_template(
    principal: Principal,
    id: &str,
    update: Json<TemplateUpdate>,
    pool: &State<Pool<Sqlite>>,
) -> Result<Json<TestTemplate>, AppError> {
    principal.require_permission(Permission::ManageTests)?;
    let validated = update.validate_custom()?;

    Ok(Json(db::update_template(pool, id, &validated).await?))
}

#[delete("/templates/<id>")]
pub async fn delete_template(
    principal: Principal,
    id: &str,
    pool: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    principal.require_permission(Permission::ManageTests)?;

    if db::delete_template(pool, id).await? {
        Ok(Status::NoContent)
    } else {
        Err(AppError::NotFound(format!("Test template {} not found", id)))
    }
}
