use std::sync::Arc;

use hiring_pipeline::Error;
use hiring_pipeline::auth::TokenService;
use hiring_pipeline::candidate_service::{build_rocket, client::HttpTestServiceClient};
use hiring_pipeline::config::{CANDIDATE_SERVICE_NAME, CandidateServiceConfig, rocket_figment};
use hiring_pipeline::database::{CANDIDATE_SERVICE_SCHEMA, connect, init_schema};
use hiring_pipeline::env::load_environment;
use hiring_pipeline::telemetry::init_tracing;
use tracing::info;

#[rocket::main]
async fn main() -> Result<(), Error> {
    let environment = load_environment(CANDIDATE_SERVICE_NAME)?;
    let config = CandidateServiceConfig::load()?;

    let _otel_guard = init_tracing(
        CANDIDATE_SERVICE_NAME,
        config.otel_exporter_otlp_endpoint.as_deref(),
    )?;
    environment.log();

    let pool = connect(&config.database_url).await?;
    init_schema(&pool, CANDIDATE_SERVICE_SCHEMA).await?;

    let tokens = TokenService::new(&config.jwt_secret, config.access_token_minutes);
    let test_service = HttpTestServiceClient::new(
        &config.test_service_url,
        config.request_timeout_secs,
        tokens.clone(),
    )?;

    info!(
        address = %config.address,
        port = config.port,
        test_service_url = %config.test_service_url,
        "Starting candidate-service"
    );

    build_rocket(
        rocket_figment(config.address, config.port),
        pool,
        tokens,
        Arc::new(test_service),
    )
    .launch()
    .await?;

    Ok(())
}
