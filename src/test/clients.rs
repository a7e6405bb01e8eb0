#[cfg(test)]
mod tests {
    use crate::candidate_service::client::{
        HttpTestServiceClient, SessionRequest, TestServiceClient,
    };
    use crate::error::AppError;
    use crate::test::test_utils::test_tokens;
    use crate::test_service::client::{
        CandidateServiceClient, HttpCandidateServiceClient, TestResult,
    };

    // Nothing listens on the discard port.
    const UNREACHABLE_URL: &str = "http://127.0.0.1:9";

    #[tokio::test]
    async fn test_unreachable_test_service_is_unavailable() {
        let client = HttpTestServiceClient::new(UNREACHABLE_URL, 2, test_tokens()).unwrap();

        let result = client
            .create_session(&SessionRequest {
                application_id: 1,
                template_id: "template".to_string(),
                candidate_email: "ivan@example.com".to_string(),
            })
            .await;

        assert!(
            matches!(result, Err(AppError::ExternalService(_))),
            "unexpected result: {:?}",
            result.map(|session| session.id)
        );
    }

    #[tokio::test]
    async fn test_unreachable_candidate_service_is_unavailable() {
        let client = HttpCandidateServiceClient::new(UNREACHABLE_URL, 2, test_tokens()).unwrap();

        let result = client
            .report_test_result(
                1,
                &TestResult {
                    session_id: "session".to_string(),
                    score: 50,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::ExternalService(_))));
    }
}
