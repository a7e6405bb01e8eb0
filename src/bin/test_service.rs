use std::sync::Arc;

use hiring_pipeline::Error;
use hiring_pipeline::auth::TokenService;
use hiring_pipeline::config::{TEST_SERVICE_NAME, TestServiceConfig, rocket_figment};
use hiring_pipeline::database::{TEST_SERVICE_SCHEMA, connect, init_schema};
use hiring_pipeline::env::load_environment;
use hiring_pipeline::telemetry::init_tracing;
use hiring_pipeline::test_service::{build_rocket, client::HttpCandidateServiceClient};
use tracing::info;

/// Test-service never issues user tokens, only short-lived service tokens.
const UNUSED_USER_TOKEN_MINUTES: i64 = 0;

#[rocket::main]
async fn main() -> Result<(), Error> {
    let environment = load_environment(TEST_SERVICE_NAME)?;
    let config = TestServiceConfig::load()?;

    let _otel_guard = init_tracing(
        TEST_SERVICE_NAME,
        config.otel_exporter_otlp_endpoint.as_deref(),
    )?;
    environment.log();

    let pool = connect(&config.database_url).await?;
    init_schema(&pool, TEST_SERVICE_SCHEMA).await?;

    let tokens = TokenService::new(&config.jwt_secret, UNUSED_USER_TOKEN_MINUTES);
    let candidate_service = HttpCandidateServiceClient::new(
        &config.candidate_service_url,
        config.request_timeout_secs,
        tokens.clone(),
    )?;

    info!(
        address = %config.address,
        port = config.port,
        candidate_service_url = %config.candidate_service_url,
        "Starting test-service"
    );

    build_rocket(
        rocket_figment(config.address, config.port),
        pool,
        tokens,
        Arc::new(candidate_service),
    )
    .launch()
    .await?;

    Ok(())
}
