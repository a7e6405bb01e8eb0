use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::auth::TokenService;
use crate::config::TEST_SERVICE_NAME;
use crate::downstream::{build_http_client, send_json};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestResult {
    pub session_id: String,
    pub score: i64,
}

#[rocket::async_trait]
pub trait CandidateServiceClient: Send + Sync {
    /// Delivers a final score for the given application.
    async fn report_test_result(&self, application_id: i64, result: &TestResult)
    -> Result<(), AppError>;
}

pub struct HttpCandidateServiceClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenService,
}

impl HttpCandidateServiceClient {
    pub fn new(base_url: &str, timeout_secs: u64, tokens: TokenService) -> Result<Self, AppError> {
        Ok(Self {
            http: build_http_client(TEST_SERVICE_NAME, timeout_secs)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }
}

#[rocket::async_trait]
impl CandidateServiceClient for HttpCandidateServiceClient {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn report_test_result(
        &self,
        application_id: i64,
        result: &TestResult,
    ) -> Result<(), AppError> {
        info!("Reporting test result");
        let token = self.tokens.issue_service_token(TEST_SERVICE_NAME)?;
        let url = format!(
            "{}/applications/{}/test-result",
            self.base_url, application_id
        );

        let _: serde_json::Value =
            send_json(self.http.post(url).json(result), &token, "candidate-service").await?;

        info!("Test result delivered");
        Ok(())
    }
}
