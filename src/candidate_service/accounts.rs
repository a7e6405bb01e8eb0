use rocket::State;
use rocket::form::Form;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use sqlx::{Pool, Sqlite};

use crate::auth::{Permission, Principal, Role, TokenService};
use crate::error::AppError;
use crate::validation::JsonValidateExt;

use super::db::{authenticate_user, create_user, find_user_by_username, get_user};
use super::models::User;
use super::schemas::{LoginForm, TokenResponse, UserRegistrationRequest};

#[post("/auth/register", data = "<registration>")]
pub async fn register(
    registration: Json<UserRegistrationRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<User>>, AppError> {
    let validated = registration.validate_custom()?;
    let role: Role = validated
        .role
        .parse()
        .map_err(|e: anyhow::Error| AppError::Validation(e.to_string()))?;

    let user_id = create_user(db, &validated.username, &validated.password, role.as_str()).await?;
    let user = get_user(db, user_id).await?;

    Ok(Custom(Status::Created, Json(user)))
}

#[post("/auth/login", data = "<form>")]
pub async fn login(
    form: Form<LoginForm>,
    db: &State<Pool<Sqlite>>,
    tokens: &State<TokenService>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = authenticate_user(db, &form.username, &form.password)
        .await?
        .ok_or_else(|| AppError::Authentication("Incorrect username or password".to_string()))?;

    let access_token = tokens.issue(&user.username, user.role)?;
    tracing::info!(username = %user.username, "User logged in");

    Ok(Json(TokenResponse::bearer(access_token)))
}

#[post("/auth/refresh")]
pub async fn refresh(
    principal: Principal,
    tokens: &State<TokenService>,
) -> Result<Json<TokenResponse>, AppError> {
    principal.require_permission(Permission::ViewOwnAccount)?;

    let access_token = tokens.issue(&principal.username, principal.role)?;
    Ok(Json(TokenResponse::bearer(access_token)))
}

async fn current_user(db: &Pool<Sqlite>, principal: &Principal) -> Result<User, AppError> {
    find_user_by_username(db, &principal.username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", principal.username)))
}

#[get("/auth/me")]
pub async fn me(principal: Principal, db: &State<Pool<Sqlite>>) -> Result<Json<User>, AppError> {
    principal.require_permission(Permission::ViewOwnAccount)?;
    Ok(Json(current_user(db, &principal).await?))
}

#[get("/auth/admin")]
pub async fn admin(principal: Principal, db: &State<Pool<Sqlite>>) -> Result<Json<User>, AppError> {
    principal.require_permission(Permission::ViewAdminArea)?;
    Ok(Json(current_user(db, &principal).await?))
}
