use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::error::{Error, Result};
use crate::utils::now_utc;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonTask {
    pub id: i64,
    pub lesson_id: i64,
    pub task_text: String,
}

/// One student's free-text response to a task, optionally marked by the
/// teacher. A student submits at most once per task.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskSubmission {
    pub id: i64,
    pub task_id: i64,
    pub student_id: i64,
    pub content: String,
    pub mark: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

/// Submission listing denormalized with lesson, task and student display
/// fields, shared by the student- and teacher-facing views.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionListing {
    pub id: i64,
    pub task_id: i64,
    pub task_text: String,
    pub lesson_id: i64,
    pub lesson_title: String,
    pub student_id: i64,
    pub student_name: String,
    pub content: String,
    pub mark: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

const SUBMISSION_COLUMNS: &str = "id, task_id, student_id, content, mark, submitted_at";

/// The lesson's task. Lessons carry one task by convention; where the schema
/// permits more the first one wins.
pub async fn get_lesson_task(database: &SqlitePool, lesson_id: i64) -> Result<Option<LessonTask>> {
    let task = sqlx::query_as::<_, LessonTask>(
        "SELECT id, lesson_id, task_text FROM lesson_task WHERE lesson_id = ? ORDER BY id LIMIT 1",
    )
    .bind(lesson_id)
    .fetch_optional(database)
    .await?;
    Ok(task)
}

pub async fn create_lesson_task(
    database: &SqlitePool,
    lesson_id: i64,
    task_text: &str,
) -> Result<LessonTask> {
    let task = sqlx::query_as::<_, LessonTask>(
        "INSERT INTO lesson_task (lesson_id, task_text) VALUES (?, ?) \
         RETURNING id, lesson_id, task_text",
    )
    .bind(lesson_id)
    .bind(task_text)
    .fetch_one(database)
    .await?;
    Ok(task)
}

pub async fn get_submissions_for_task(
    database: &SqlitePool,
    task_id: i64,
) -> Result<Vec<TaskSubmission>> {
    let submissions = sqlx::query_as::<_, TaskSubmission>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM task_submission WHERE task_id = ? \
         ORDER BY submitted_at DESC, id DESC"
    ))
    .bind(task_id)
    .fetch_all(database)
    .await?;
    Ok(submissions)
}

pub async fn get_submissions_for_student(
    database: &SqlitePool,
    task_id: i64,
    student_id: i64,
) -> Result<Vec<TaskSubmission>> {
    let submissions = sqlx::query_as::<_, TaskSubmission>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM task_submission WHERE task_id = ? AND student_id = ? \
         ORDER BY submitted_at DESC, id DESC"
    ))
    .bind(task_id)
    .bind(student_id)
    .fetch_all(database)
    .await?;
    Ok(submissions)
}

/// Record a student's response. The (task, student) uniqueness lives in the
/// store; a constraint violation is the duplicate-submission signal, so two
/// racing submissions cannot both land.
pub async fn submit_task_response(
    database: &SqlitePool,
    task_id: i64,
    student_id: i64,
    content: &str,
) -> Result<TaskSubmission> {
    let task_exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lesson_task WHERE id = ?")
        .bind(task_id)
        .fetch_one(database)
        .await?;
    if task_exists == 0 {
        return Err(Error::NotFound("Task not found".to_string()));
    }

    let submission = sqlx::query_as::<_, TaskSubmission>(&format!(
        "INSERT INTO task_submission (task_id, student_id, content, submitted_at) \
         VALUES (?, ?, ?, ?) RETURNING {SUBMISSION_COLUMNS}"
    ))
    .bind(task_id)
    .bind(student_id)
    .bind(content)
    .bind(now_utc())
    .fetch_one(database)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Error::BadRequest("You have already submitted this task".to_string())
        }
        _ => Error::Database(e),
    })?;
    Ok(submission)
}

/// Teacher-assigned mark. The update itself is the existence check.
pub async fn update_task_mark(
    database: &SqlitePool,
    submission_id: i64,
    mark: i64,
) -> Result<TaskSubmission> {
    let submission = sqlx::query_as::<_, TaskSubmission>(&format!(
        "UPDATE task_submission SET mark = ? WHERE id = ? RETURNING {SUBMISSION_COLUMNS}"
    ))
    .bind(mark)
    .bind(submission_id)
    .fetch_optional(database)
    .await?;
    submission.ok_or_else(|| Error::NotFound("Submission not found".to_string()))
}

const LISTING_COLUMNS: &str = "SELECT sub.id, sub.task_id, t.task_text, t.lesson_id, \
     l.title AS lesson_title, sub.student_id, s.name AS student_name, \
     sub.content, sub.mark, sub.submitted_at \
     FROM task_submission sub \
     JOIN lesson_task t ON t.id = sub.task_id \
     JOIN lesson l ON l.id = t.lesson_id \
     JOIN student s ON s.id = sub.student_id";

pub async fn get_task_submissions_by_student(
    database: &SqlitePool,
    student_id: i64,
) -> Result<Vec<SubmissionListing>> {
    let submissions = sqlx::query_as::<_, SubmissionListing>(&format!(
        "{LISTING_COLUMNS} WHERE sub.student_id = ? ORDER BY sub.submitted_at DESC, sub.id DESC"
    ))
    .bind(student_id)
    .fetch_all(database)
    .await?;
    Ok(submissions)
}

pub async fn get_task_submissions_for_lesson(
    database: &SqlitePool,
    lesson_id: i64,
) -> Result<Vec<SubmissionListing>> {
    let submissions = sqlx::query_as::<_, SubmissionListing>(&format!(
        "{LISTING_COLUMNS} WHERE t.lesson_id = ? ORDER BY sub.submitted_at DESC, sub.id DESC"
    ))
    .bind(lesson_id)
    .fetch_all(database)
    .await?;
    Ok(submissions)
}
