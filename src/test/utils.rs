#[cfg(test)]
pub mod test_utils {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex, Once};

    use rocket::http::Header;
    use rocket::local::asynchronous::Client;
    use sqlx::{Pool, Sqlite};
    use tracing::log::LevelFilter;

    use crate::auth::{Role, TokenService};
    use crate::candidate_service::client::{CreatedSession, SessionRequest, TestServiceClient};
    use crate::candidate_service::schemas::{CandidateCreate, VacancyCreate};
    use crate::candidate_service::{self, SharedTestServiceClient};
    use crate::database::{CANDIDATE_SERVICE_SCHEMA, TEST_SERVICE_SCHEMA, connect, init_schema};
    use crate::error::AppError;
    use crate::test_service::client::{CandidateServiceClient, TestResult};
    use crate::test_service::schemas::{AnswerOptionCreate, QuestionCreate, TemplateCreate};
    use crate::test_service::{self, SharedCandidateServiceClient};

    static INIT: Once = Once::new();
    pub static STANDARD_PASSWORD: &str = "password123";
    pub static TEST_SECRET: &str = "test-secret";

    pub fn init_test_logging() {
        INIT.call_once(|| {
            let _ = env_logger::builder()
                .filter_level(LevelFilter::Debug)
                .is_test(true)
                .try_init();
        });
    }

    pub fn test_tokens() -> TokenService {
        TokenService::new(TEST_SECRET, 60)
    }

    pub fn bearer(username: &str, role: Role) -> Header<'static> {
        let token = test_tokens()
            .issue(username, role)
            .expect("token should be issued");
        Header::new("Authorization", format!("Bearer {}", token))
    }

    pub fn user_auth() -> Header<'static> {
        bearer("regular_user", Role::User)
    }

    pub fn admin_auth() -> Header<'static> {
        bearer("admin_user", Role::Admin)
    }

    struct TestUser {
        username: String,
        role: Role,
    }

    struct TestQuestion {
        template: String,
        sequence: i64,
        text: String,
    }

    struct TestOption {
        question: String,
        text: String,
        is_correct: bool,
    }

    #[derive(Default)]
    pub struct TestDbBuilder {
        users: Vec<TestUser>,
        candidates: Vec<CandidateCreate>,
        vacancies: Vec<VacancyCreate>,
        templates: Vec<TemplateCreate>,
        questions: Vec<TestQuestion>,
        options: Vec<TestOption>,
    }

    impl TestDbBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn user(mut self, username: &str) -> Self {
            self.users.push(TestUser {
                username: username.to_string(),
                role: Role::User,
            });
            self
        }

        pub fn admin(mut self, username: &str) -> Self {
            self.users.push(TestUser {
                username: username.to_string(),
                role: Role::Admin,
            });
            self
        }

        pub fn candidate(mut self, first_name: &str, last_name: &str, email: &str) -> Self {
            self.candidates.push(CandidateCreate {
                last_name: last_name.to_string(),
                first_name: first_name.to_string(),
                middle_name: None,
                email: email.to_string(),
                phone: None,
            });
            self
        }

        pub fn vacancy(mut self, title: &str) -> Self {
            self.vacancies.push(VacancyCreate {
                title: title.to_string(),
                description: Some(format!("{} position", title)),
            });
            self
        }

        pub fn template(mut self, title: &str) -> Self {
            self.templates.push(TemplateCreate {
                title: title.to_string(),
                description: None,
            });
            self
        }

        pub fn question(mut self, template: &str, sequence: i64, text: &str) -> Self {
            self.questions.push(TestQuestion {
                template: template.to_string(),
                sequence,
                text: text.to_string(),
            });
            self
        }

        pub fn option(mut self, question: &str, text: &str, is_correct: bool) -> Self {
            self.options.push(TestOption {
                question: question.to_string(),
                text: text.to_string(),
                is_correct,
            });
            self
        }

        pub async fn build(self) -> Result<TestDb, AppError> {
            init_test_logging();

            let candidate_pool = connect("sqlite::memory:").await?;
            init_schema(&candidate_pool, CANDIDATE_SERVICE_SCHEMA).await?;
            let test_pool = connect("sqlite::memory:").await?;
            init_schema(&test_pool, TEST_SERVICE_SCHEMA).await?;

            let mut ids = TestDb {
                candidate_pool,
                test_pool,
                user_ids: HashMap::new(),
                candidate_ids: HashMap::new(),
                vacancy_ids: HashMap::new(),
                template_ids: HashMap::new(),
                question_ids: HashMap::new(),
                option_ids: HashMap::new(),
            };

            for user in &self.users {
                let id = candidate_service::db::create_user(
                    &ids.candidate_pool,
                    &user.username,
                    STANDARD_PASSWORD,
                    user.role.as_str(),
                )
                .await?;
                ids.user_ids.insert(user.username.clone(), id);
            }

            for candidate in &self.candidates {
                let created =
                    candidate_service::db::create_candidate(&ids.candidate_pool, candidate).await?;
                ids.candidate_ids.insert(candidate.email.clone(), created.id);
            }

            for vacancy in &self.vacancies {
                let created =
                    candidate_service::db::create_vacancy(&ids.candidate_pool, vacancy).await?;
                ids.vacancy_ids.insert(vacancy.title.clone(), created.id);
            }

            for template in &self.templates {
                let created = test_service::db::create_template(&ids.test_pool, template).await?;
                ids.template_ids.insert(template.title.clone(), created.id);
            }

            for question in &self.questions {
                let template_id = ids.template_id(&question.template);
                let created = test_service::db::create_question(
                    &ids.test_pool,
                    &QuestionCreate {
                        template_id,
                        sequence: question.sequence,
                        text: question.text.clone(),
                    },
                )
                .await?;
                ids.question_ids.insert(question.text.clone(), created.id);
            }

            for option in &self.options {
                let question_id = ids.question_id(&option.question);
                let created = test_service::db::create_answer_option(
                    &ids.test_pool,
                    &AnswerOptionCreate {
                        question_id: question_id.clone(),
                        sequence: None,
                        text: option.text.clone(),
                        is_correct: option.is_correct,
                    },
                )
                .await?;
                ids.option_ids
                    .insert((question_id, option.text.clone()), created.id);
            }

            Ok(ids)
        }
    }

    pub struct TestDb {
        pub candidate_pool: Pool<Sqlite>,
        pub test_pool: Pool<Sqlite>,
        pub user_ids: HashMap<String, i64>,
        pub candidate_ids: HashMap<String, i64>,
        pub vacancy_ids: HashMap<String, i64>,
        pub template_ids: HashMap<String, String>,
        pub question_ids: HashMap<String, String>,
        option_ids: HashMap<(String, String), String>,
    }

    impl TestDb {
        pub fn candidate_id(&self, email: &str) -> i64 {
            self.candidate_ids[email]
        }

        pub fn vacancy_id(&self, title: &str) -> i64 {
            self.vacancy_ids[title]
        }

        pub fn template_id(&self, title: &str) -> String {
            self.template_ids[title].clone()
        }

        pub fn question_id(&self, text: &str) -> String {
            self.question_ids[text].clone()
        }

        pub fn option_id(&self, question: &str, text: &str) -> String {
            self.option_ids[&(self.question_id(question), text.to_string())].clone()
        }
    }

    /// Users, two candidates, a vacancy and a three-question arithmetic test.
    pub async fn create_standard_test_db() -> TestDb {
        TestDbBuilder::new()
            .user("regular_user")
            .admin("admin_user")
            .candidate("Ivan", "Petrov", "ivan@example.com")
            .candidate("Anna", "Smirnova", "anna@example.com")
            .vacancy("Backend Developer")
            .template("Arithmetic")
            .question("Arithmetic", 1, "2 + 2")
            .question("Arithmetic", 2, "3 * 3")
            .question("Arithmetic", 3, "10 - 7")
            .option("2 + 2", "4", true)
            .option("2 + 2", "5", false)
            .option("3 * 3", "9", true)
            .option("3 * 3", "6", false)
            .option("10 - 7", "3", true)
            .option("10 - 7", "2", false)
            .build()
            .await
            .expect("Failed to build standard test database")
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum FakeOutcome {
        Succeed,
        Unreachable,
        Rejected,
        NotFound,
    }

    impl FakeOutcome {
        fn error(self) -> Option<AppError> {
            match self {
                FakeOutcome::Succeed => None,
                FakeOutcome::Unreachable => Some(AppError::ExternalService(
                    "connection refused".to_string(),
                )),
                FakeOutcome::Rejected => Some(AppError::Upstream("returned 500".to_string())),
                FakeOutcome::NotFound => Some(AppError::NotFound("not found".to_string())),
            }
        }
    }

    pub struct FakeTestService {
        outcome: FakeOutcome,
        pub requests: Mutex<Vec<SessionRequest>>,
    }

    impl FakeTestService {
        pub fn new(outcome: FakeOutcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn recorded(&self) -> Vec<SessionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[rocket::async_trait]
    impl TestServiceClient for FakeTestService {
        async fn create_session(
            &self,
            request: &SessionRequest,
        ) -> Result<CreatedSession, AppError> {
            self.requests.lock().unwrap().push(request.clone());

            if let Some(err) = self.outcome.error() {
                return Err(err);
            }

            Ok(CreatedSession {
                id: format!("session-{}", request.application_id),
                token: "session-token".to_string(),
                status: "created".to_string(),
            })
        }
    }

    pub struct FakeCandidateService {
        outcome: FakeOutcome,
        pub reports: Mutex<Vec<(i64, TestResult)>>,
    }

    impl FakeCandidateService {
        pub fn new(outcome: FakeOutcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                reports: Mutex::new(Vec::new()),
            })
        }

        pub fn recorded(&self) -> Vec<(i64, TestResult)> {
            self.reports.lock().unwrap().clone()
        }
    }

    #[rocket::async_trait]
    impl CandidateServiceClient for FakeCandidateService {
        async fn report_test_result(
            &self,
            application_id: i64,
            result: &TestResult,
        ) -> Result<(), AppError> {
            self.reports
                .lock()
                .unwrap()
                .push((application_id, result.clone()));

            match self.outcome.error() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    pub async fn setup_candidate_client(test_db: &TestDb, test_service: Arc<FakeTestService>) -> Client {
        let shared: SharedTestServiceClient = test_service;
        let rocket = candidate_service::build_rocket(
            rocket::Config::figment(),
            test_db.candidate_pool.clone(),
            test_tokens(),
            shared,
        );

        Client::tracked(rocket)
            .await
            .expect("valid candidate-service instance")
    }

    pub async fn setup_test_service_client(
        test_db: &TestDb,
        candidate_service: Arc<FakeCandidateService>,
    ) -> Client {
        let shared: SharedCandidateServiceClient = candidate_service;
        let rocket = test_service::build_rocket(
            rocket::Config::figment(),
            test_db.test_pool.clone(),
            test_tokens(),
            shared,
        );

        Client::tracked(rocket)
            .await
            .expect("valid test-service instance")
    }
}
