pub mod answers;
pub mod client;
pub mod db;
pub mod models;
pub mod questions;
pub mod schemas;
pub mod scoring;
pub mod sessions;
pub mod templates;

use rocket::figment::Figment;
use rocket::serde::json::Json;
use rocket::{Build, Rocket};
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::auth::TokenService;
use crate::config::TEST_SERVICE_NAME;
use crate::health::HealthResponse;
use crate::telemetry::TelemetryFairing;
use crate::validation::json_catcher;

pub use sessions::SharedCandidateServiceClient;

#[get("/health")]
pub fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok(TEST_SERVICE_NAME))
}

pub fn build_rocket(
    figment: Figment,
    pool: Pool<Sqlite>,
    tokens: TokenService,
    candidate_service: SharedCandidateServiceClient,
) -> Rocket<Build> {
    info!("Building test-service");

    rocket::custom(figment)
        .manage(pool)
        .manage(tokens)
        .manage(candidate_service)
        .mount(
            "/",
            routes![
                health,
                templates::create_template,
                templates::get_template,
                templates::list_templates,
                templates::update_template,
                templates::delete_template,
                questions::create_question,
                questions::get_question,
                questions::list_questions,
                questions::update_question,
                questions::delete_question,
                answers::create_answer_option,
                answers::get_answer_option,
                answers::list_answer_options,
                answers::update_answer_option,
                answers::delete_answer_option,
                sessions::create_session,
                sessions::get_session,
                sessions::list_sessions,
                sessions::update_session_score,
                sessions::delete_session,
                sessions::submit_answer,
                sessions::list_session_answers,
                sessions::finish_session,
            ],
        )
        .register("/", catchers![json_catcher])
        .attach(TelemetryFairing)
}
