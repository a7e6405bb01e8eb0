pub mod accounts;
pub mod applications;
pub mod candidates;
pub mod client;
pub mod db;
pub mod models;
pub mod schemas;
pub mod vacancies;

use rocket::figment::Figment;
use rocket::serde::json::Json;
use rocket::{Build, Rocket};
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::auth::TokenService;
use crate::config::CANDIDATE_SERVICE_NAME;
use crate::health::HealthResponse;
use crate::telemetry::TelemetryFairing;
use crate::validation::json_catcher;

pub use applications::SharedTestServiceClient;

#[get("/health")]
pub fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok(CANDIDATE_SERVICE_NAME))
}

pub fn build_rocket(
    figment: Figment,
    pool: Pool<Sqlite>,
    tokens: TokenService,
    test_service: SharedTestServiceClient,
) -> Rocket<Build> {
    info!("Building candidate-service");

    rocket::custom(figment)
        .manage(pool)
        .manage(tokens)
        .manage(test_service)
        .mount(
            "/",
            routes![
                health,
                accounts::register,
                accounts::login,
                accounts::refresh,
                accounts::me,
                accounts::admin,
                candidates::create_candidate,
                candidates::get_candidate,
                candidates::list_candidates,
                candidates::update_candidate,
                candidates::delete_candidate,
                vacancies::create_vacancy,
                vacancies::get_vacancy,
                vacancies::list_vacancies,
                vacancies::update_vacancy,
                vacancies::delete_vacancy,
                applications::create_application,
                applications::get_application,
                applications::list_applications,
                applications::update_application,
                applications::update_application_status,
                applications::delete_application,
                applications::assign_test_route,
                applications::record_test_result,
            ],
        )
        .register("/", catchers![json_catcher])
        .attach(TelemetryFairing)
}
