//! Plumbing shared by the service-to-service HTTP clients.

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode, header::HeaderMap};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::telemetry::inject_trace_context;

pub fn build_http_client(service_name: &str, timeout_secs: u64) -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .user_agent(format!("{}/{}", service_name, env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))
}

/// Sends an authenticated request and decodes a JSON reply.
///
/// Connection failures and timeouts become `ExternalService` (503), a 404 from
/// the peer becomes `NotFound`, any other non-success status becomes
/// `Upstream` (502).
pub async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    bearer_token: &str,
    what: &str,
) -> Result<T, AppError> {
    let mut headers = HeaderMap::new();
    inject_trace_context(&mut headers);

    let response = request
        .headers(headers)
        .bearer_auth(bearer_token)
        .send()
        .await
        .map_err(|e| AppError::ExternalService(format!("{}: {}", what, e)))?;

    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::NotFound(format!("{}: {}", what, body)));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::Upstream(format!(
            "{} returned {}: {}",
            what,
            status.as_u16(),
            body
        )));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| AppError::Upstream(format!("{} sent an unreadable reply: {}", what, e)))
}
