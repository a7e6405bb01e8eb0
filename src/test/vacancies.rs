#[cfg(test)]
mod tests {
    use rocket::http::{ContentType, Status};
    use serde_json::json;

    use crate::candidate_service::models::Vacancy;
    use crate::test::test_utils::{
        FakeOutcome, FakeTestService, admin_auth, create_standard_test_db, setup_candidate_client,
        user_auth,
    };

    #[rocket::async_test]
    async fn test_create_vacancy_requires_admin() {
        let test_db = create_standard_test_db().await;
        let client = setup_candidate_client(&test_db, FakeTestService::new(FakeOutcome::Succeed)).await;
        let body = json!({"title": "QA Engineer", "description": "Manual and automated testing"});

        let forbidden = client
            .post("/vacancies")
            .header(ContentType::JSON)
            .header(user_auth())
            .body(body.to_string())
            .dispatch()
            .await;
        assert_eq!(forbidden.status(), Status::Forbidden);

        let created = client
            .post("/vacancies")
            .header(ContentType::JSON)
            .header(admin_auth())
            .body(body.to_string())
            .dispatch()
            .await;
        assert_eq!(created.status(), Status::Created);

        let vacancy: Vacancy = created.into_json().await.unwrap();
        assert_eq!(vacancy.title, "QA Engineer");

        let fetched = client
            .get(format!("/vacancies/{}", vacancy.id))
            .header(user_auth())
            .dispatch()
            .await;
        assert_eq!(fetched.status(), Status::Ok);
    }

    #[rocket::async_test]
    async fn test_vacancy_title_is_validated() {
        let test_db = create_standard_test_db().await;
        let client = setup_candidate_client(&test_db, FakeTestService::new(FakeOutcome::Succeed)).await;

        for title in [String::new(), "x".repeat(101)] {
            let response = client
                .post("/vacancies")
                .header(ContentType::JSON)
                .header(admin_auth())
                .body(json!({ "title": title }).to_string())
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::BadRequest);
        }
    }

    #[rocket::async_test]
    async fn test_update_and_delete_vacancy() {
        let test_db = create_standard_test_db().await;
        let client = setup_candidate_client(&test_db, FakeTestService::new(FakeOutcome::Succeed)).await;
        let id = test_db.vacancy_id("Backend Developer");

        let updated = client
            .put(format!("/vacancies/{}", id))
            .header(ContentType::JSON)
            .header(admin_auth())
            .body(json!({"title": "Senior Backend Developer"}).to_string())
            .dispatch()
            .await;
        assert_eq!(updated.status(), Status::Ok);

        let vacancy: Vacancy = updated.into_json().await.unwrap();
        assert_eq!(vacancy.title, "Senior Backend Developer");
        assert_eq!(vacancy.description.as_deref(), Some("Backend Developer position"));

        let list: Vec<Vacancy> = client
            .get("/vacancies?limit=5")
            .header(user_auth())
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(list.len(), 1);

        let deleted = client
            .delete(format!("/vacancies/{}", id))
            .header(admin_auth())
            .dispatch()
            .await;
        assert_eq!(deleted.status(), Status::NoContent);

        let missing = client
            .get(format!("/vacancies/{}", id))
            .header(user_auth())
            .dispatch()
            .await;
        assert_eq!(missing.status(), Status::NotFound);
    }
}
