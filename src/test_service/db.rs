use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::AppError;
use crate::validation::Page;

use super::models::{
    AnswerOption, DbAnswerOption, DbQuestion, DbSessionAnswer, DbTestSession, DbTestTemplate,
    Question, SessionAnswer, SessionStatus, TestSession, TestTemplate,
};
use super::schemas::{
    AnswerOptionCreate, AnswerOptionUpdate, QuestionCreate, QuestionUpdate, SessionAnswerCreate,
    SessionCreate, TemplateCreate, TemplateUpdate,
};
use super::scoring::calculate_score;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[instrument(skip(pool, template), fields(title = %template.title))]
pub async fn create_template(
    pool: &Pool<Sqlite>,
    template: &TemplateCreate,
) -> Result<TestTemplate, AppError> {
    info!("Creating test template");
    let id = new_id();

    sqlx::query("INSERT INTO test_templates (id, title, description) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(&template.title)
        .bind(&template.description)
        .execute(pool)
        .await?;

    get_template(pool, &id).await
}

#[instrument(skip(pool))]
pub async fn get_template(pool: &Pool<Sqlite>, id: &str) -> Result<TestTemplate, AppError> {
    info!("Fetching test template");
    let row = sqlx::query_as::<_, DbTestTemplate>("SELECT * FROM test_templates WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(template) => Ok(TestTemplate::from(template)),
        _ => Err(AppError::NotFound(format!("Test template {} not found", id))),
    }
}

#[instrument(skip(pool))]
pub async fn list_templates(pool: &Pool<Sqlite>, page: Page) -> Result<Vec<TestTemplate>, AppError> {
    info!("Listing test templates");
    let rows = sqlx::query_as::<_, DbTestTemplate>(
        "SELECT * FROM test_templates ORDER BY created_at, id LIMIT ? OFFSET ?",
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(TestTemplate::from).collect())
}

#[instrument(skip(pool, update))]
pub async fn update_template(
    pool: &Pool<Sqlite>,
    id: &str,
    update: &TemplateUpdate,
) -> Result<TestTemplate, AppError> {
    info!("Updating test template");
    let current = get_template(pool, id).await?;

    let title = update.title.as_ref().unwrap_or(&current.title);
    let description = update.description.as_ref().or(current.description.as_ref());

    sqlx::query(
        "UPDATE test_templates
         SET title = ?, description = ?, updated_at = CURRENT_TIMESTAMP
         WHERE id = ?",
    )
    .bind(title)
    .bind(description)
    .bind(id)
    .execute(pool)
    .await?;

    get_template(pool, id).await
}

#[instrument(skip(pool))]
pub async fn delete_template(pool: &Pool<Sqlite>, id: &str) -> Result<bool, AppError> {
    info!("Deleting test template");
    let result = sqlx::query("DELETE FROM test_templates WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[instrument(skip(pool, question), fields(template_id = %question.template_id))]
pub async fn create_question(
    pool: &Pool<Sqlite>,
    question: &QuestionCreate,
) -> Result<Question, AppError> {
    info!("Creating question");
    get_template(pool, &question.template_id).await?;
    let id = new_id();

    sqlx::query("INSERT INTO questions (id, template_id, sequence, text) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(&question.template_id)
        .bind(question.sequence)
        .bind(&question.text)
        .execute(pool)
        .await?;

    get_question(pool, &id).await
}

async fn find_question(pool: &Pool<Sqlite>, id: &str) -> Result<Option<Question>, AppError> {
    let row = sqlx::query_as::<_, DbQuestion>("SELECT * FROM questions WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(Question::from))
}

async fn options_for_question(
    pool: &Pool<Sqlite>,
    question_id: &str,
) -> Result<Vec<AnswerOption>, AppError> {
    let rows = sqlx::query_as::<_, DbAnswerOption>(
        "SELECT * FROM answer_options WHERE question_id = ? ORDER BY sequence, id",
    )
    .bind(question_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(AnswerOption::from).collect())
}

/// Fetches a question together with its answer options.
#[instrument(skip(pool))]
pub async fn get_question(pool: &Pool<Sqlite>, id: &str) -> Result<Question, AppError> {
    info!("Fetching question");
    let mut question = find_question(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Question {} not found", id)))?;

    question.answer_options = options_for_question(pool, id).await?;
    Ok(question)
}

#[instrument(skip(pool))]
pub async fn list_questions(
    pool: &Pool<Sqlite>,
    template_id: Option<&str>,
    page: Page,
) -> Result<Vec<Question>, AppError> {
    info!("Listing questions");
    let rows = sqlx::query_as::<_, DbQuestion>(
        "SELECT * FROM questions
         WHERE (?1 IS NULL OR template_id = ?1)
         ORDER BY template_id, sequence, id
         LIMIT ?2 OFFSET ?3",
    )
    .bind(template_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await?;

    let mut questions = Vec::with_capacity(rows.len());
    for row in rows {
        let mut question = Question::from(row);
        question.answer_options = options_for_question(pool, &question.id).await?;
        questions.push(question);
    }

    Ok(questions)
}

#[instrument(skip(pool, update))]
pub async fn update_question(
    pool: &Pool<Sqlite>,
    id: &str,
    update: &QuestionUpdate,
) -> Result<Question, AppError> {
    info!("Updating question");
    let current = get_question(pool, id).await?;

    let sequence = update.sequence.unwrap_or(current.sequence);
    let text = update.text.as_ref().unwrap_or(&current.text);

    sqlx::query(
        "UPDATE questions SET sequence = ?, text = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(sequence)
    .bind(text)
    .bind(id)
    .execute(pool)
    .await?;

    get_question(pool, id).await
}

#[instrument(skip(pool))]
pub async fn delete_question(pool: &Pool<Sqlite>, id: &str) -> Result<bool, AppError> {
    info!("Deleting question");
    let result = sqlx::query("DELETE FROM questions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[instrument(skip(pool, option), fields(question_id = %option.question_id))]
pub async fn create_answer_option(
    pool: &Pool<Sqlite>,
    option: &AnswerOptionCreate,
) -> Result<AnswerOption, AppError> {
    info!("Creating answer option");
    if find_question(pool, &option.question_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Question {} not found",
            option.question_id
        )));
    }

    let sequence = match option.sequence {
        Some(sequence) => sequence,
        None => {
            let (last,): (Option<i64>,) =
                sqlx::query_as("SELECT MAX(sequence) FROM answer_options WHERE question_id = ?")
                    .bind(&option.question_id)
                    .fetch_one(pool)
                    .await?;
            last.unwrap_or(0) + 1
        }
    };

    let id = new_id();
    sqlx::query(
        "INSERT INTO answer_options (id, question_id, sequence, text, is_correct)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&option.question_id)
    .bind(sequence)
    .bind(&option.text)
    .bind(option.is_correct)
    .execute(pool)
    .await?;

    get_answer_option(pool, &id).await
}

#[instrument(skip(pool))]
pub async fn get_answer_option(pool: &Pool<Sqlite>, id: &str) -> Result<AnswerOption, AppError> {
    info!("Fetching answer option");
    let row = sqlx::query_as::<_, DbAnswerOption>("SELECT * FROM answer_options WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(option) => Ok(AnswerOption::from(option)),
        _ => Err(AppError::NotFound(format!("Answer option {} not found", id))),
    }
}

#[instrument(skip(pool))]
pub async fn list_answer_options(
    pool: &Pool<Sqlite>,
    question_id: Option<&str>,
    page: Page,
) -> Result<Vec<AnswerOption>, AppError> {
    info!("Listing answer options");
    let rows = sqlx::query_as::<_, DbAnswerOption>(
        "SELECT * FROM answer_options
         WHERE (?1 IS NULL OR question_id = ?1)
         ORDER BY question_id, sequence, id
         LIMIT ?2 OFFSET ?3",
    )
    .bind(question_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(AnswerOption::from).collect())
}

#[instrument(skip(pool, update))]
pub async fn update_answer_option(
    pool: &Pool<Sqlite>,
    id: &str,
    update: &AnswerOptionUpdate,
) -> Result<AnswerOption, AppError> {
    info!("Updating answer option");
    let current = get_answer_option(pool, id).await?;

    let sequence = update.sequence.unwrap_or(current.sequence);
    let text = update.text.as_ref().unwrap_or(&current.text);
    let is_correct = update.is_correct.unwrap_or(current.is_correct());

    sqlx::query(
        "UPDATE answer_options
         SET sequence = ?, text = ?, is_correct = ?, updated_at = CURRENT_TIMESTAMP
         WHERE id = ?",
    )
    .bind(sequence)
    .bind(text)
    .bind(is_correct)
    .bind(id)
    .execute(pool)
    .await?;

    get_answer_option(pool, id).await
}

#[instrument(skip(pool))]
pub async fn delete_answer_option(pool: &Pool<Sqlite>, id: &str) -> Result<bool, AppError> {
    info!("Deleting answer option");
    let result = sqlx::query("DELETE FROM answer_options WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[instrument(skip(pool, session), fields(application_id = session.application_id))]
pub async fn create_session(
    pool: &Pool<Sqlite>,
    session: &SessionCreate,
) -> Result<TestSession, AppError> {
    info!("Creating test session");
    get_template(pool, &session.template_id).await?;

    let id = new_id();
    sqlx::query(
        "INSERT INTO test_sessions (id, template_id, application_id, candidate_email, token)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&session.template_id)
    .bind(session.application_id)
    .bind(&session.candidate_email)
    .bind(new_id())
    .execute(pool)
    .await?;

    get_session(pool, &id).await
}

#[instrument(skip(pool))]
pub async fn get_session(pool: &Pool<Sqlite>, id: &str) -> Result<TestSession, AppError> {
    info!("Fetching test session");
    let row = sqlx::query_as::<_, DbTestSession>("SELECT * FROM test_sessions WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(session) => TestSession::try_from(session),
        _ => Err(AppError::NotFound(format!("Test session {} not found", id))),
    }
}

#[instrument(skip(pool))]
pub async fn list_sessions(
    pool: &Pool<Sqlite>,
    candidate_email: Option<&str>,
    page: Page,
) -> Result<Vec<TestSession>, AppError> {
    info!("Listing test sessions");
    let rows = sqlx::query_as::<_, DbTestSession>(
        "SELECT * FROM test_sessions
         WHERE (?1 IS NULL OR candidate_email = ?1)
         ORDER BY created_at, id
         LIMIT ?2 OFFSET ?3",
    )
    .bind(candidate_email)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(TestSession::try_from).collect()
}

/// Overwrites the stored score without touching the session status.
#[instrument(skip(pool))]
pub async fn set_session_score(
    pool: &Pool<Sqlite>,
    id: &str,
    score: i64,
) -> Result<TestSession, AppError> {
    info!("Overriding test session score");
    let result = sqlx::query("UPDATE test_sessions SET score = ? WHERE id = ?")
        .bind(score)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Test session {} not found", id)));
    }

    get_session(pool, id).await
}

#[instrument(skip(pool))]
pub async fn delete_session(pool: &Pool<Sqlite>, id: &str) -> Result<bool, AppError> {
    info!("Deleting test session");
    let result = sqlx::query("DELETE FROM test_sessions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Records one answer and moves a fresh session to `in_progress`.
///
/// The question must belong to the session's template and the chosen option
/// to that question. Each question can be answered once per session.
#[instrument(skip(pool, answer), fields(question_id = %answer.question_id))]
pub async fn submit_answer(
    pool: &Pool<Sqlite>,
    session_id: &str,
    answer: &SessionAnswerCreate,
) -> Result<SessionAnswer, AppError> {
    info!("Submitting session answer");
    let session = get_session(pool, session_id).await?;

    if session.status == SessionStatus::Scored {
        return Err(AppError::Validation(format!(
            "Test session {} is already scored",
            session_id
        )));
    }

    match find_question(pool, &answer.question_id).await? {
        Some(question) if question.template_id == session.template_id => {}
        _ => {
            return Err(AppError::Validation(format!(
                "Question {} is not part of this test",
                answer.question_id
            )));
        }
    }

    let option = sqlx::query_as::<_, DbAnswerOption>("SELECT * FROM answer_options WHERE id = ?")
        .bind(&answer.answer_id)
        .fetch_optional(pool)
        .await?
        .map(AnswerOption::from);

    match option {
        Some(option) if option.question_id == answer.question_id => {}
        _ => {
            return Err(AppError::Validation(format!(
                "Answer {} does not belong to question {}",
                answer.answer_id, answer.question_id
            )));
        }
    }

    let id = new_id();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO session_answers (id, session_id, question_id, answer_id) VALUES (?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(session_id)
    .bind(&answer.question_id)
    .bind(&answer.answer_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| AppError::map_unique_violation(e, "Question has already been answered"))?;

    if session.status == SessionStatus::Created {
        sqlx::query(
            "UPDATE test_sessions SET status = ?, started_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(SessionStatus::InProgress.as_str())
        .bind(session_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    get_session_answer(pool, &id).await
}

async fn get_session_answer(pool: &Pool<Sqlite>, id: &str) -> Result<SessionAnswer, AppError> {
    let row = sqlx::query_as::<_, DbSessionAnswer>("SELECT * FROM session_answers WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(SessionAnswer::from)
        .ok_or_else(|| AppError::NotFound(format!("Session answer {} not found", id)))
}

#[instrument(skip(pool))]
pub async fn list_session_answers(
    pool: &Pool<Sqlite>,
    session_id: &str,
    page: Page,
) -> Result<Vec<SessionAnswer>, AppError> {
    info!("Listing session answers");
    get_session(pool, session_id).await?;

    let rows = sqlx::query_as::<_, DbSessionAnswer>(
        "SELECT * FROM session_answers
         WHERE session_id = ?
         ORDER BY answered_at, id
         LIMIT ? OFFSET ?",
    )
    .bind(session_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(SessionAnswer::from).collect())
}

/// Scores a session and marks it `scored`.
///
/// A session that is already scored is returned unchanged.
#[instrument(skip(pool))]
pub async fn finish_session(pool: &Pool<Sqlite>, id: &str) -> Result<TestSession, AppError> {
    info!("Finishing test session");
    let session = get_session(pool, id).await?;

    if session.status == SessionStatus::Scored {
        info!("Test session already scored");
        return Ok(session);
    }

    let (total_questions,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM questions WHERE template_id = ?")
            .bind(&session.template_id)
            .fetch_one(pool)
            .await?;

    let (correct_answers,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*)
         FROM session_answers sa
         JOIN answer_options ao ON ao.id = sa.answer_id
         JOIN questions q ON q.id = sa.question_id
         WHERE sa.session_id = ? AND q.template_id = ? AND ao.is_correct = 1",
    )
    .bind(id)
    .bind(&session.template_id)
    .fetch_one(pool)
    .await?;

    let score = calculate_score(correct_answers, total_questions);
    info!(correct_answers, total_questions, score, "Test session scored");

    sqlx::query(
        "UPDATE test_sessions
         SET status = ?, score = ?, completed_at = CURRENT_TIMESTAMP,
             started_at = COALESCE(started_at, CURRENT_TIMESTAMP)
         WHERE id = ?",
    )
    .bind(SessionStatus::Scored.as_str())
    .bind(score)
    .bind(id)
    .execute(pool)
    .await?;

    get_session(pool, id).await
}
