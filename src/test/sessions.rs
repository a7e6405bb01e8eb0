#[cfg(test)]
mod tests {
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;
    use serde_json::json;

    use crate::test::test_utils::{
        FakeCandidateService, FakeOutcome, TestDb, admin_auth, create_standard_test_db,
        setup_test_service_client, user_auth,
    };
    use crate::test_service::client::TestResult;
    use crate::test_service::db::get_session;
    use crate::test_service::models::{SessionAnswer, SessionStatus, TestSession};

    async fn open_session(client: &Client, test_db: &TestDb, application_id: i64) -> TestSession {
        let response = client
            .post("/sessions")
            .header(ContentType::JSON)
            .header(admin_auth())
            .body(
                json!({
                    "application_id": application_id,
                    "template_id": test_db.template_id("Arithmetic"),
                    "candidate_email": "ivan@example.com"
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Created);
        response.into_json().await.unwrap()
    }

    async fn answer(
        client: &Client,
        session_id: &str,
        question_id: &str,
        answer_id: &str,
    ) -> Status {
        client
            .post(format!("/sessions/{}/answers", session_id))
            .header(ContentType::JSON)
            .header(user_auth())
            .body(json!({"question_id": question_id, "answer_id": answer_id}).to_string())
            .dispatch()
            .await
            .status()
    }

    #[rocket::async_test]
    async fn test_create_session() {
        let test_db = create_standard_test_db().await;
        let client =
            setup_test_service_client(&test_db, FakeCandidateService::new(FakeOutcome::Succeed)).await;

        let session = open_session(&client, &test_db, 7).await;
        assert_eq!(session.application_id, 7);
        assert_eq!(session.status, SessionStatus::Created);
        assert!(session.score.is_none());
        assert!(uuid::Uuid::parse_str(&session.token).is_ok());
        assert_ne!(session.token, session.id);

        let missing_template = client
            .post("/sessions")
            .header(ContentType::JSON)
            .header(admin_auth())
            .body(
                json!({"application_id": 7, "template_id": "missing", "candidate_email": "a@b.io"})
                    .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(missing_template.status(), Status::NotFound);

        let by_user = client
            .post("/sessions")
            .header(ContentType::JSON)
            .header(user_auth())
            .body(
                json!({
                    "application_id": 7,
                    "template_id": test_db.template_id("Arithmetic"),
                    "candidate_email": "ivan@example.com"
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(by_user.status(), Status::Forbidden);
    }

    #[rocket::async_test]
    async fn test_list_sessions_by_email() {
        let test_db = create_standard_test_db().await;
        let client =
            setup_test_service_client(&test_db, FakeCandidateService::new(FakeOutcome::Succeed)).await;
        open_session(&client, &test_db, 1).await;
        open_session(&client, &test_db, 2).await;

        let sessions: Vec<TestSession> = client
            .get("/sessions?candidate_email=ivan@example.com&limit=1")
            .header(user_auth())
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(sessions.len(), 1);

        let none: Vec<TestSession> = client
            .get("/sessions?candidate_email=nobody@example.com")
            .header(user_auth())
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[rocket::async_test]
    async fn test_first_answer_starts_session() {
        let test_db = create_standard_test_db().await;
        let client =
            setup_test_service_client(&test_db, FakeCandidateService::new(FakeOutcome::Succeed)).await;
        let session = open_session(&client, &test_db, 1).await;

        let response = client
            .post(format!("/sessions/{}/answers", session.id))
            .header(ContentType::JSON)
            .header(user_auth())
            .body(
                json!({
                    "question_id": test_db.question_id("2 + 2"),
                    "answer_id": test_db.option_id("2 + 2", "4")
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Created);
        let stored: SessionAnswer = response.into_json().await.unwrap();
        assert_eq!(stored.session_id, session.id);

        let started = get_session(&test_db.test_pool, &session.id).await.unwrap();
        assert_eq!(started.status, SessionStatus::InProgress);
        assert!(started.started_at.is_some());

        let answers: Vec<SessionAnswer> = client
            .get(format!("/sessions/{}/answers", session.id))
            .header(user_auth())
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(answers.len(), 1);
    }

    #[rocket::async_test]
    async fn test_answer_validation() {
        let test_db = create_standard_test_db().await;
        let client =
            setup_test_service_client(&test_db, FakeCandidateService::new(FakeOutcome::Succeed)).await;
        let session = open_session(&client, &test_db, 1).await;

        let other_template = client
            .post("/templates")
            .header(ContentType::JSON)
            .header(admin_auth())
            .body(json!({"title": "Geography"}).to_string())
            .dispatch()
            .await
            .into_json::<crate::test_service::models::TestTemplate>()
            .await
            .unwrap();
        let foreign_question = client
            .post("/questions")
            .header(ContentType::JSON)
            .header(admin_auth())
            .body(
                json!({"template_id": other_template.id, "sequence": 1, "text": "Capital of France"})
                    .to_string(),
            )
            .dispatch()
            .await
            .into_json::<crate::test_service::models::Question>()
            .await
            .unwrap();

        let question = test_db.question_id("2 + 2");
        let right = test_db.option_id("2 + 2", "4");
        let other_questions_option = test_db.option_id("3 * 3", "9");

        assert_eq!(
            answer(&client, &session.id, &foreign_question.id, &right).await,
            Status::BadRequest
        );
        assert_eq!(
            answer(&client, &session.id, &question, &other_questions_option).await,
            Status::BadRequest
        );
        assert_eq!(
            answer(&client, &session.id, &question, "missing-option").await,
            Status::BadRequest
        );
        assert_eq!(
            answer(&client, "missing-session", &question, &right).await,
            Status::NotFound
        );

        assert_eq!(answer(&client, &session.id, &question, &right).await, Status::Created);
        assert_eq!(
            answer(&client, &session.id, &question, &right).await,
            Status::BadRequest
        );
    }

    #[rocket::async_test]
    async fn test_finish_scores_and_reports_result() {
        let test_db = create_standard_test_db().await;
        let fake = FakeCandidateService::new(FakeOutcome::Succeed);
        let client = setup_test_service_client(&test_db, fake.clone()).await;
        let session = open_session(&client, &test_db, 42).await;

        answer(
            &client,
            &session.id,
            &test_db.question_id("2 + 2"),
            &test_db.option_id("2 + 2", "4"),
        )
        .await;
        answer(
            &client,
            &session.id,
            &test_db.question_id("3 * 3"),
            &test_db.option_id("3 * 3", "9"),
        )
        .await;
        answer(
            &client,
            &session.id,
            &test_db.question_id("10 - 7"),
            &test_db.option_id("10 - 7", "2"),
        )
        .await;

        let response = client
            .post(format!("/sessions/{}/finish", session.id))
            .header(user_auth())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let finished: TestSession = response.into_json().await.unwrap();
        assert_eq!(finished.status, SessionStatus::Scored);
        assert_eq!(finished.score, Some(67));
        assert!(finished.completed_at.is_some());

        assert_eq!(
            fake.recorded(),
            vec![(
                42,
                TestResult {
                    session_id: session.id.clone(),
                    score: 67
                }
            )]
        );

        let late_answer = answer(
            &client,
            &session.id,
            &test_db.question_id("10 - 7"),
            &test_db.option_id("10 - 7", "3"),
        )
        .await;
        assert_eq!(late_answer, Status::BadRequest);
    }

    #[rocket::async_test]
    async fn test_finish_without_answers_scores_zero() {
        let test_db = create_standard_test_db().await;
        let fake = FakeCandidateService::new(FakeOutcome::Succeed);
        let client = setup_test_service_client(&test_db, fake.clone()).await;
        let session = open_session(&client, &test_db, 3).await;

        let finished: TestSession = client
            .post(format!("/sessions/{}/finish", session.id))
            .header(user_auth())
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(finished.score, Some(0));
        assert_eq!(fake.recorded()[0].1.score, 0);
    }

    #[rocket::async_test]
    async fn test_finish_keeps_score_when_report_fails() {
        let test_db = create_standard_test_db().await;
        let client = setup_test_service_client(
            &test_db,
            FakeCandidateService::new(FakeOutcome::Unreachable),
        )
        .await;
        let session = open_session(&client, &test_db, 5).await;
        answer(
            &client,
            &session.id,
            &test_db.question_id("2 + 2"),
            &test_db.option_id("2 + 2", "4"),
        )
        .await;

        let response = client
            .post(format!("/sessions/{}/finish", session.id))
            .header(user_auth())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::ServiceUnavailable);

        let stored = get_session(&test_db.test_pool, &session.id).await.unwrap();
        assert_eq!(stored.status, SessionStatus::Scored);
        assert_eq!(stored.score, Some(33));
    }

    #[rocket::async_test]
    async fn test_finishing_twice_resends_stored_score() {
        let test_db = create_standard_test_db().await;
        let fake = FakeCandidateService::new(FakeOutcome::Succeed);
        let client = setup_test_service_client(&test_db, fake.clone()).await;
        let session = open_session(&client, &test_db, 9).await;

        client
            .post(format!("/sessions/{}/finish", session.id))
            .header(user_auth())
            .dispatch()
            .await;

        client
            .patch(format!("/sessions/{}/score?score=80", session.id))
            .header(admin_auth())
            .dispatch()
            .await;

        let again: TestSession = client
            .post(format!("/sessions/{}/finish", session.id))
            .header(user_auth())
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(again.score, Some(80));

        let reports = fake.recorded();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].1.score, 80);
    }

    #[rocket::async_test]
    async fn test_manual_score_override_and_delete() {
        let test_db = create_standard_test_db().await;
        let client =
            setup_test_service_client(&test_db, FakeCandidateService::new(FakeOutcome::Succeed)).await;
        let session = open_session(&client, &test_db, 11).await;

        let forbidden = client
            .patch(format!("/sessions/{}/score?score=50", session.id))
            .header(user_auth())
            .dispatch()
            .await;
        assert_eq!(forbidden.status(), Status::Forbidden);

        let out_of_range = client
            .patch(format!("/sessions/{}/score?score=150", session.id))
            .header(admin_auth())
            .dispatch()
            .await;
        assert_eq!(out_of_range.status(), Status::BadRequest);

        let updated: TestSession = client
            .patch(format!("/sessions/{}/score?score=50", session.id))
            .header(admin_auth())
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(updated.score, Some(50));
        assert_eq!(updated.status, SessionStatus::Created);

        let deleted = client
            .delete(format!("/sessions/{}", session.id))
            .header(admin_auth())
            .dispatch()
            .await;
        assert_eq!(deleted.status(), Status::NoContent);

        let missing = client
            .get(format!("/sessions/{}", session.id))
            .header(user_auth())
            .dispatch()
            .await;
        assert_eq!(missing.status(), Status::NotFound);
    }
}
