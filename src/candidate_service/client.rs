use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::auth::TokenService;
use crate::config::CANDIDATE_SERVICE_NAME;
use crate::downstream::{build_http_client, send_json};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRequest {
    pub application_id: i64,
    pub template_id: String,
    pub candidate_email: String,
}

/// The part of test-service's session reply this service keeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedSession {
    pub id: String,
    pub token: String,
    pub status: String,
}

#[rocket::async_trait]
pub trait TestServiceClient: Send + Sync {
    async fn create_session(&self, request: &SessionRequest) -> Result<CreatedSession, AppError>;
}

pub struct HttpTestServiceClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenService,
}

impl HttpTestServiceClient {
    pub fn new(base_url: &str, timeout_secs: u64, tokens: TokenService) -> Result<Self, AppError> {
        Ok(Self {
            http: build_http_client(CANDIDATE_SERVICE_NAME, timeout_secs)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }
}

#[rocket::async_trait]
impl TestServiceClient for HttpTestServiceClient {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn create_session(&self, request: &SessionRequest) -> Result<CreatedSession, AppError> {
        info!("Requesting test session");
        let token = self.tokens.issue_service_token(CANDIDATE_SERVICE_NAME)?;
        let url = format!("{}/sessions", self.base_url);

        let session: CreatedSession =
            send_json(self.http.post(url).json(request), &token, "test-service").await?;

        info!(session_id = %session.id, "Test session created");
        Ok(session)
    }
}
