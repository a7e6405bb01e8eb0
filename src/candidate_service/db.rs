use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::validation::Page;

use super::models::{
    ApplicationStatus, Candidate, DbCandidate, DbJobApplication, DbUser, DbVacancy,
    JobApplication, User, Vacancy,
};
use super::schemas::{CandidateCreate, CandidateUpdate, VacancyCreate, VacancyUpdate};

const USER_COLUMNS: &str = "id, username, role, is_active, created_at";

#[instrument(skip_all, fields(username, role))]
pub async fn create_user(
    pool: &Pool<Sqlite>,
    username: &str,
    password: &str,
    role: &str,
) -> Result<i64, AppError> {
    info!("Creating new user");

    let existing_user = find_user_by_username(pool, username).await?;

    if existing_user.is_some() {
        return Err(AppError::Validation(
            "Username already registered".to_string(),
        ));
    }

    let hashed_password = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;

    let res = sqlx::query("INSERT INTO users (username, hashed_password, role) VALUES (?, ?, ?)")
        .bind(username)
        .bind(hashed_password)
        .bind(role)
        .execute(pool)
        .await
        .map_err(|e| AppError::map_unique_violation(e, "Username already registered"))?;

    Ok(res.last_insert_rowid())
}

#[instrument(skip(pool))]
pub async fn get_user(pool: &Pool<Sqlite>, id: i64) -> Result<User, AppError> {
    info!("Fetching user by ID");
    let row = sqlx::query_as::<_, DbUser>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(user) => User::try_from(user),
        _ => Err(AppError::NotFound(format!("User with id {} not found", id))),
    }
}

#[instrument(skip(pool))]
pub async fn find_user_by_username(
    pool: &Pool<Sqlite>,
    username: &str,
) -> Result<Option<User>, AppError> {
    info!("Finding user by username");
    let row = sqlx::query_as::<_, DbUser>(&format!(
        "SELECT {} FROM users WHERE username = ?",
        USER_COLUMNS
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;

    row.map(User::try_from).transpose()
}

/// Returns the user when the password matches and the account is active.
#[instrument(skip_all, fields(username))]
pub async fn authenticate_user(
    pool: &Pool<Sqlite>,
    username: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    info!("Authenticating user");
    let stored: Option<(i64, String)> =
        sqlx::query_as("SELECT id, hashed_password FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;

    let Some((id, hashed_password)) = stored else {
        return Ok(None);
    };

    if !bcrypt::verify(password, &hashed_password).unwrap_or(false) {
        return Ok(None);
    }

    let user = get_user(pool, id).await?;
    Ok(user.is_active.then_some(user))
}

#[instrument(skip(pool, candidate), fields(email = %candidate.email))]
pub async fn create_candidate(
    pool: &Pool<Sqlite>,
    candidate: &CandidateCreate,
) -> Result<Candidate, AppError> {
    info!("Creating candidate");
    let res = sqlx::query(
        "INSERT INTO candidates (last_name, first_name, middle_name, email, phone)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&candidate.last_name)
    .bind(&candidate.first_name)
    .bind(&candidate.middle_name)
    .bind(&candidate.email)
    .bind(&candidate.phone)
    .execute(pool)
    .await
    .map_err(|e| AppError::map_unique_violation(e, "Candidate with this email already exists"))?;

    get_candidate(pool, res.last_insert_rowid()).await
}

#[instrument(skip(pool))]
pub async fn get_candidate(pool: &Pool<Sqlite>, id: i64) -> Result<Candidate, AppError> {
    info!("Fetching candidate");
    let row = sqlx::query_as::<_, DbCandidate>("SELECT * FROM candidates WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(candidate) => Ok(Candidate::from(candidate)),
        _ => Err(AppError::NotFound(format!("Candidate with id {} not found", id))),
    }
}

#[instrument(skip(pool))]
pub async fn list_candidates(pool: &Pool<Sqlite>, page: Page) -> Result<Vec<Candidate>, AppError> {
    info!("Listing candidates");
    let rows = sqlx::query_as::<_, DbCandidate>(
        "SELECT * FROM candidates ORDER BY id LIMIT ? OFFSET ?",
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Candidate::from).collect())
}

#[instrument(skip(pool, update))]
pub async fn update_candidate(
    pool: &Pool<Sqlite>,
    id: i64,
    update: &CandidateUpdate,
) -> Result<Candidate, AppError> {
    info!("Updating candidate");
    let current = get_candidate(pool, id).await?;

    let last_name = update.last_name.as_ref().unwrap_or(&current.last_name);
    let first_name = update.first_name.as_ref().unwrap_or(&current.first_name);
    let middle_name = update.middle_name.as_ref().or(current.middle_name.as_ref());
    let email = update.email.as_ref().unwrap_or(&current.email);
    let phone = update.phone.as_ref().or(current.phone.as_ref());
    let status = update.status.as_ref().unwrap_or(&current.status);

    sqlx::query(
        "UPDATE candidates
         SET last_name = ?, first_name = ?, middle_name = ?, email = ?, phone = ?, status = ?
         WHERE id = ?",
    )
    .bind(last_name)
    .bind(first_name)
    .bind(middle_name)
    .bind(email)
    .bind(phone)
    .bind(status)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| AppError::map_unique_violation(e, "Candidate with this email already exists"))?;

    get_candidate(pool, id).await
}

/// Returns false when there was nothing to delete.
#[instrument(skip(pool))]
pub async fn delete_candidate(pool: &Pool<Sqlite>, id: i64) -> Result<bool, AppError> {
    info!("Deleting candidate");
    let result = sqlx::query("DELETE FROM candidates WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[instrument(skip(pool, vacancy), fields(title = %vacancy.title))]
pub async fn create_vacancy(
    pool: &Pool<Sqlite>,
    vacancy: &VacancyCreate,
) -> Result<Vacancy, AppError> {
    info!("Creating vacancy");
    let res = sqlx::query("INSERT INTO vacancies (title, description) VALUES (?, ?)")
        .bind(&vacancy.title)
        .bind(&vacancy.description)
        .execute(pool)
        .await?;

    get_vacancy(pool, res.last_insert_rowid()).await
}

#[instrument(skip(pool))]
pub async fn get_vacancy(pool: &Pool<Sqlite>, id: i64) -> Result<Vacancy, AppError> {
    info!("Fetching vacancy");
    let row = sqlx::query_as::<_, DbVacancy>("SELECT * FROM vacancies WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(vacancy) => Ok(Vacancy::from(vacancy)),
        _ => Err(AppError::NotFound(format!("Vacancy with id {} not found", id))),
    }
}

#[instrument(skip(pool))]
pub async fn list_vacancies(pool: &Pool<Sqlite>, page: Page) -> Result<Vec<Vacancy>, AppError> {
    info!("Listing vacancies");
    let rows =
        sqlx::query_as::<_, DbVacancy>("SELECT * FROM vacancies ORDER BY id LIMIT ? OFFSET ?")
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(Vacancy::from).collect())
}

#[instrument(skip(pool, update))]
pub async fn update_vacancy(
    pool: &Pool<Sqlite>,
    id: i64,
    update: &VacancyUpdate,
) -> Result<Vacancy, AppError> {
    info!("Updating vacancy");
    let current = get_vacancy(pool, id).await?;

    let title = update.title.as_ref().unwrap_or(&current.title);
    let description = update.description.as_ref().or(current.description.as_ref());

    sqlx::query("UPDATE vacancies SET title = ?, description = ? WHERE id = ?")
        .bind(title)
        .bind(description)
        .bind(id)
        .execute(pool)
        .await?;

    get_vacancy(pool, id).await
}

#[instrument(skip(pool))]
pub async fn delete_vacancy(pool: &Pool<Sqlite>, id: i64) -> Result<bool, AppError> {
    info!("Deleting vacancy");
    let result = sqlx::query("DELETE FROM vacancies WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[instrument(skip(pool))]
pub async fn create_application(
    pool: &Pool<Sqlite>,
    candidate_id: i64,
    vacancy_id: i64,
) -> Result<JobApplication, AppError> {
    info!("Creating job application");
    get_candidate(pool, candidate_id).await?;
    get_vacancy(pool, vacancy_id).await?;

    let res = sqlx::query("INSERT INTO job_applications (candidate_id, vacancy_id) VALUES (?, ?)")
        .bind(candidate_id)
        .bind(vacancy_id)
        .execute(pool)
        .await?;

    get_application(pool, res.last_insert_rowid()).await
}

#[instrument(skip(pool))]
pub async fn get_application(pool: &Pool<Sqlite>, id: i64) -> Result<JobApplication, AppError> {
    info!("Fetching job application");
    let row = sqlx::query_as::<_, DbJobApplication>("SELECT * FROM job_applications WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(application) => JobApplication::try_from(application),
        _ => Err(AppError::NotFound(format!(
            "Application with id {} not found",
            id
        ))),
    }
}

#[instrument(skip(pool))]
pub async fn list_applications(
    pool: &Pool<Sqlite>,
    candidate_id: Option<i64>,
    vacancy_id: Option<i64>,
    page: Page,
) -> Result<Vec<JobApplication>, AppError> {
    info!("Listing job applications");
    let rows = sqlx::query_as::<_, DbJobApplication>(
        "SELECT * FROM job_applications
         WHERE (?1 IS NULL OR candidate_id = ?1)
           AND (?2 IS NULL OR vacancy_id = ?2)
         ORDER BY id
         LIMIT ?3 OFFSET ?4",
    )
    .bind(candidate_id)
    .bind(vacancy_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(JobApplication::try_from).collect()
}

#[instrument(skip(pool))]
pub async fn update_application(
    pool: &Pool<Sqlite>,
    id: i64,
    status: Option<ApplicationStatus>,
    test_score: Option<i64>,
) -> Result<JobApplication, AppError> {
    info!("Updating job application");
    let current = get_application(pool, id).await?;

    let status = status.unwrap_or(current.status);
    let test_score = test_score.or(current.test_score);

    sqlx::query(
        "UPDATE job_applications
         SET status = ?, test_score = ?, updated_at = CURRENT_TIMESTAMP
         WHERE id = ?",
    )
    .bind(status.as_str())
    .bind(test_score)
    .bind(id)
    .execute(pool)
    .await?;

    get_application(pool, id).await
}

#[instrument(skip(pool))]
pub async fn set_application_status(
    pool: &Pool<Sqlite>,
    id: i64,
    status: ApplicationStatus,
) -> Result<JobApplication, AppError> {
    info!(status = %status, "Setting job application status");
    update_application(pool, id, Some(status), None).await
}

/// Links the application to its test session and marks it `applied`.
#[instrument(skip(pool))]
pub async fn attach_test_session(
    pool: &Pool<Sqlite>,
    id: i64,
    session_id: &str,
) -> Result<JobApplication, AppError> {
    info!("Attaching test session to job application");
    let result = sqlx::query(
        "UPDATE job_applications
         SET test_session_id = ?, status = ?, updated_at = CURRENT_TIMESTAMP
         WHERE id = ?",
    )
    .bind(session_id)
    .bind(ApplicationStatus::Applied.as_str())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Application with id {} not found",
            id
        )));
    }

    get_application(pool, id).await
}

/// Stores a reported score and marks the application `tested`.
#[instrument(skip(pool))]
pub async fn record_test_result(
    pool: &Pool<Sqlite>,
    id: i64,
    session_id: &str,
    score: i64,
) -> Result<JobApplication, AppError> {
    info!("Recording test result");
    let current = get_application(pool, id).await?;

    if let Some(expected) = &current.test_session_id {
        if expected != session_id {
            return Err(AppError::Validation(format!(
                "Application {} is linked to session {}, not {}",
                id, expected, session_id
            )));
        }
    }

    sqlx::query(
        "UPDATE job_applications
         SET test_session_id = ?, test_score = ?, status = ?, updated_at = CURRENT_TIMESTAMP
         WHERE id = ?",
    )
    .bind(session_id)
    .bind(score)
    .bind(ApplicationStatus::Tested.as_str())
    .bind(id)
    .execute(pool)
    .await?;

    get_application(pool, id).await
}

#[instrument(skip(pool))]
pub async fn delete_application(pool: &Pool<Sqlite>, id: i64) -> Result<bool, AppError> {
    info!("Deleting job application");
    let result = sqlx::query("DELETE FROM job_applications WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
