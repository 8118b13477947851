//! Read-only aggregation queries behind the teacher and student dashboards.
//! Each endpoint issues one grouped query and assembles the rest in memory.

use serde::Serialize;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::error::Result;

/// Per-lesson engagement counters for a teacher's lesson list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonStats {
    pub id: i64,
    pub title: String,
    pub video_url: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub view_count: i64,
    pub students_attempted: i64,
    pub average_score: i64,
}

/// One student's view/quiz/task signals for a lesson. Covers every student,
/// not only those who interacted.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentEngagement {
    pub student_id: i64,
    pub student_name: String,
    pub viewed: bool,
    pub latest_score: Option<i64>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub latest_attempt_at: Option<OffsetDateTime>,
    pub task_submitted: bool,
    pub task_mark: Option<i64>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgress {
    pub student_id: i64,
    pub student_name: String,
    pub viewed: bool,
    pub quiz_attempted: bool,
    pub task_submitted: bool,
    pub completed_count: i64,
    pub total_activities: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentDashboard {
    pub total_lessons: i64,
    pub lessons_completed: i64,
    pub average_score: i64,
    /// Rough placeholder: one hour per completed lesson.
    pub learning_hours: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDashboard {
    pub total_lessons: i64,
    pub students_engaged: i64,
    pub quiz_submissions: i64,
    pub task_submissions: i64,
}

pub async fn get_teacher_lessons_with_stats(
    database: &SqlitePool,
    teacher_id: i64,
) -> Result<Vec<LessonStats>> {
    let lessons = sqlx::query_as::<_, LessonStats>(
        "SELECT l.id, l.title, l.video_url, l.published_at, l.created_at, \
            (SELECT COUNT(*) FROM lesson_view v WHERE v.lesson_id = l.id) AS view_count, \
            (SELECT COUNT(DISTINCT qa.student_id) FROM quiz_attempt qa \
             WHERE qa.lesson_id = l.id) AS students_attempted, \
            CAST(COALESCE((SELECT ROUND(AVG(qa.score)) FROM quiz_attempt qa \
             WHERE qa.lesson_id = l.id), 0) AS INTEGER) AS average_score \
         FROM lesson l WHERE l.teacher_id = ? ORDER BY l.created_at DESC, l.id DESC",
    )
    .bind(teacher_id)
    .fetch_all(database)
    .await?;
    Ok(lessons)
}

pub async fn get_lesson_engagement(
    database: &SqlitePool,
    lesson_id: i64,
) -> Result<Vec<StudentEngagement>> {
    let rows = sqlx::query_as::<_, StudentEngagement>(
        "SELECT s.id AS student_id, s.name AS student_name, \
            v.student_id IS NOT NULL AS viewed, \
            la.score AS latest_score, \
            la.submitted_at AS latest_attempt_at, \
            ts.id IS NOT NULL AS task_submitted, \
            ts.mark AS task_mark \
         FROM student s \
         LEFT JOIN lesson_view v ON v.lesson_id = ?1 AND v.student_id = s.id \
         LEFT JOIN (SELECT qa.student_id, qa.score, qa.submitted_at \
             FROM quiz_attempt qa \
             WHERE qa.lesson_id = ?1 \
               AND qa.id = (SELECT qa2.id FROM quiz_attempt qa2 \
                   WHERE qa2.lesson_id = ?1 AND qa2.student_id = qa.student_id \
                   ORDER BY qa2.submitted_at DESC, qa2.id DESC LIMIT 1) \
         ) la ON la.student_id = s.id \
         LEFT JOIN (SELECT sub.student_id, sub.id, sub.mark \
             FROM task_submission sub \
             WHERE sub.task_id = (SELECT id FROM lesson_task \
                 WHERE lesson_id = ?1 ORDER BY id LIMIT 1) \
         ) ts ON ts.student_id = s.id \
         ORDER BY s.id",
    )
    .bind(lesson_id)
    .fetch_all(database)
    .await?;
    Ok(rows)
}

pub async fn get_student_progress_summary(
    database: &SqlitePool,
    lesson_id: i64,
) -> Result<Vec<StudentProgress>> {
    let rows = sqlx::query_as::<_, StudentProgress>(
        "SELECT s.id AS student_id, s.name AS student_name, \
            v.student_id IS NOT NULL AS viewed, \
            qa.student_id IS NOT NULL AS quiz_attempted, \
            ts.student_id IS NOT NULL AS task_submitted, \
            (v.student_id IS NOT NULL) + (qa.student_id IS NOT NULL) \
                + (ts.student_id IS NOT NULL) AS completed_count, \
            3 AS total_activities \
         FROM student s \
         LEFT JOIN lesson_view v ON v.lesson_id = ?1 AND v.student_id = s.id \
         LEFT JOIN (SELECT DISTINCT student_id FROM quiz_attempt \
             WHERE lesson_id = ?1) qa ON qa.student_id = s.id \
         LEFT JOIN (SELECT DISTINCT sub.student_id FROM task_submission sub \
             JOIN lesson_task t ON t.id = sub.task_id \
             WHERE t.lesson_id = ?1) ts ON ts.student_id = s.id \
         ORDER BY s.id",
    )
    .bind(lesson_id)
    .fetch_all(database)
    .await?;
    Ok(rows)
}

pub async fn get_student_dashboard_stats(
    database: &SqlitePool,
    student_id: i64,
) -> Result<StudentDashboard> {
    let (total_lessons, lessons_completed, average_score) =
        sqlx::query_as::<_, (i64, i64, i64)>(
            "SELECT \
                (SELECT COUNT(*) FROM lesson) AS total_lessons, \
                (SELECT COUNT(*) FROM ( \
                    SELECT lesson_id FROM quiz_attempt WHERE student_id = ?1 \
                    UNION \
                    SELECT t.lesson_id FROM task_submission sub \
                    JOIN lesson_task t ON t.id = sub.task_id \
                    WHERE sub.student_id = ?1 \
                )) AS lessons_completed, \
                CAST(COALESCE((SELECT ROUND(AVG(score)) FROM quiz_attempt \
                    WHERE student_id = ?1), 0) AS INTEGER) AS average_score",
        )
        .bind(student_id)
        .fetch_one(database)
        .await?;
    Ok(StudentDashboard {
        total_lessons,
        lessons_completed,
        average_score,
        learning_hours: lessons_completed,
    })
}

pub async fn get_teacher_dashboard_stats(
    database: &SqlitePool,
    teacher_id: i64,
) -> Result<TeacherDashboard> {
    let dashboard = sqlx::query_as::<_, TeacherDashboard>(
        "SELECT \
            (SELECT COUNT(*) FROM lesson WHERE teacher_id = ?1) AS total_lessons, \
            (SELECT COUNT(DISTINCT v.student_id) FROM lesson_view v \
             JOIN lesson l ON l.id = v.lesson_id \
             WHERE l.teacher_id = ?1) AS students_engaged, \
            (SELECT COUNT(*) FROM quiz_attempt qa \
             JOIN lesson l ON l.id = qa.lesson_id \
             WHERE l.teacher_id = ?1) AS quiz_submissions, \
            (SELECT COUNT(*) FROM task_submission sub \
             JOIN lesson_task t ON t.id = sub.task_id \
             JOIN lesson l ON l.id = t.lesson_id \
             WHERE l.teacher_id = ?1) AS task_submissions",
    )
    .bind(teacher_id)
    .fetch_one(database)
    .await?;
    Ok(dashboard)
}
