use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::error::{Error, Result};
use crate::quiz::{self, QuizQuestion};
use crate::task::{self, LessonTask, TaskSubmission};
use crate::teacher::{self, TeacherInfo};
use crate::utils::now_utc;

const LESSON_COLUMNS: &str =
    "id, title, description, video_url, teacher_id, published_at, created_at";

/// A content unit owned by a teacher, with an associated video, quiz and task.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub teacher_id: i64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLesson {
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub teacher_id: i64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLesson {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
}

/// Conjunctive listing filter: the search term matches title or description
/// case-insensitively, ANDed with exact equality on any other given field.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonFilter {
    pub search_term: Option<String>,
    pub teacher_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    CreatedAt,
    Title,
    PublishedAt,
}

impl SortField {
    fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Title => "title",
            SortField::PublishedAt => "published_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort_by: SortField::CreatedAt,
            sort_order: SortOrder::Desc,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LessonPage {
    pub meta: PageMeta,
    pub data: Vec<Lesson>,
}

/// The lesson's task together with its submissions. Submissions are limited
/// to one student when the lesson is fetched on a student's behalf.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: LessonTask,
    pub submissions: Vec<TaskSubmission>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonDetail {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub teacher: TeacherInfo,
    pub quiz_questions: Vec<QuizQuestion>,
    pub task: Option<TaskDetail>,
}

pub async fn create_lesson(database: &SqlitePool, input: CreateLesson) -> Result<Lesson> {
    let lesson = sqlx::query_as::<_, Lesson>(
        "INSERT INTO lesson (title, description, video_url, teacher_id, published_at, created_at) \
         VALUES (?, ?, ?, ?, ?, ?) \
         RETURNING id, title, description, video_url, teacher_id, published_at, created_at",
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.video_url)
    .bind(input.teacher_id)
    .bind(input.published_at)
    .bind(now_utc())
    .fetch_one(database)
    .await?;
    Ok(lesson)
}

pub(crate) async fn fetch_lesson(database: &SqlitePool, id: i64) -> Result<Option<Lesson>> {
    let lesson = sqlx::query_as::<_, Lesson>(&format!(
        "SELECT {LESSON_COLUMNS} FROM lesson WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(database)
    .await?;
    Ok(lesson)
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &LessonFilter) {
    let mut prefix = " WHERE ";
    if let Some(term) = filter.search_term.as_deref() {
        let pattern = format!("%{term}%");
        query
            .push(prefix)
            .push("(title LIKE ")
            .push_bind(pattern.clone())
            .push(" OR description LIKE ")
            .push_bind(pattern)
            .push(")");
        prefix = " AND ";
    }
    if let Some(teacher_id) = filter.teacher_id {
        query.push(prefix).push("teacher_id = ").push_bind(teacher_id);
    }
}

pub async fn get_all_lessons(
    database: &SqlitePool,
    filter: LessonFilter,
    pagination: Pagination,
) -> Result<LessonPage> {
    let page = pagination.page.max(1);
    let limit = pagination.limit.clamp(1, 100);

    let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM lesson");
    push_filters(&mut count_query, &filter);
    let total: i64 = count_query.build_query_scalar().fetch_one(database).await?;

    let mut query = QueryBuilder::new(format!("SELECT {LESSON_COLUMNS} FROM lesson"));
    push_filters(&mut query, &filter);
    query.push(format!(
        " ORDER BY {} {}",
        pagination.sort_by.column(),
        pagination.sort_order.keyword()
    ));
    query.push(" LIMIT ").push_bind(limit);
    query.push(" OFFSET ").push_bind((page - 1) * limit);
    let data = query.build_query_as::<Lesson>().fetch_all(database).await?;

    Ok(LessonPage {
        meta: PageMeta { page, limit, total },
        data,
    })
}

/// Fetch one lesson with its questions, task and owning teacher. When called
/// on a student's behalf the view is recorded idempotently and the task's
/// submissions are narrowed to that student.
pub async fn get_single_lesson(
    database: &SqlitePool,
    id: i64,
    student_id: Option<i64>,
) -> Result<LessonDetail> {
    let Some(lesson) = fetch_lesson(database, id).await? else {
        return Err(Error::NotFound("Lesson not found".to_string()));
    };
    if let Some(student_id) = student_id {
        record_lesson_view(database, id, student_id).await?;
    }
    let teacher = teacher::get_teacher(database, lesson.teacher_id)
        .await?
        .ok_or_else(|| Error::NotFound("Teacher not found".to_string()))?;
    let quiz_questions = quiz::get_questions(database, id).await?;
    let task = match task::get_lesson_task(database, id).await? {
        Some(task) => {
            let submissions = match student_id {
                Some(student_id) => {
                    task::get_submissions_for_student(database, task.id, student_id).await?
                }
                None => task::get_submissions_for_task(database, task.id).await?,
            };
            Some(TaskDetail { task, submissions })
        }
        None => None,
    };
    Ok(LessonDetail {
        lesson,
        teacher,
        quiz_questions,
        task,
    })
}

/// Idempotent view record: a repeated view of the same lesson by the same
/// student leaves exactly one row.
pub async fn record_lesson_view(
    database: &SqlitePool,
    lesson_id: i64,
    student_id: i64,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO lesson_view (lesson_id, student_id, viewed_at) VALUES (?, ?, ?) \
         ON CONFLICT (lesson_id, student_id) DO NOTHING",
    )
    .bind(lesson_id)
    .bind(student_id)
    .bind(now_utc())
    .execute(database)
    .await?;
    Ok(())
}

pub async fn update_lesson(database: &SqlitePool, id: i64, input: UpdateLesson) -> Result<Lesson> {
    let Some(existing) = fetch_lesson(database, id).await? else {
        return Err(Error::NotFound("Lesson not found".to_string()));
    };
    let lesson = sqlx::query_as::<_, Lesson>(
        "UPDATE lesson SET title = ?, description = ?, video_url = ?, published_at = ? \
         WHERE id = ? \
         RETURNING id, title, description, video_url, teacher_id, published_at, created_at",
    )
    .bind(input.title.unwrap_or(existing.title))
    .bind(input.description.unwrap_or(existing.description))
    .bind(input.video_url.unwrap_or(existing.video_url))
    .bind(input.published_at.or(existing.published_at))
    .bind(id)
    .fetch_one(database)
    .await?;
    Ok(lesson)
}

/// Delete a lesson; questions, tasks, attempts and views go with it.
pub async fn delete_lesson(database: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM lesson WHERE id = ?")
        .bind(id)
        .execute(database)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Lesson not found".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{memory_pool, seed_lesson, seed_question, seed_student, seed_task, seed_teacher};

    #[tokio::test]
    async fn single_lesson_includes_relations_and_records_view_once() {
        let pool = memory_pool().await;
        let teacher_id = seed_teacher(&pool, "Alice Johnson").await;
        let student_id = seed_student(&pool, "Student A").await;
        let lesson = seed_lesson(&pool, teacher_id, "Derivatives").await;
        seed_question(&pool, lesson.id, "A").await;
        seed_task(&pool, lesson.id).await;

        let detail = get_single_lesson(&pool, lesson.id, Some(student_id))
            .await
            .unwrap();
        assert_eq!(detail.lesson.id, lesson.id);
        assert_eq!(detail.teacher.id, teacher_id);
        assert_eq!(detail.quiz_questions.len(), 1);
        assert!(detail.task.is_some());

        // second fetch by the same student must not add another view row
        get_single_lesson(&pool, lesson.id, Some(student_id))
            .await
            .unwrap();
        let views: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lesson_view WHERE lesson_id = ?")
            .bind(lesson.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(views, 1);
    }

    #[tokio::test]
    async fn missing_lesson_is_not_found() {
        let pool = memory_pool().await;
        let err = get_single_lesson(&pool, 404, None).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        let err = update_lesson(&pool, 404, UpdateLesson::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        let err = delete_lesson(&pool, 404).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn search_term_matches_case_insensitively() {
        let pool = memory_pool().await;
        let teacher_id = seed_teacher(&pool, "Bob Williams").await;
        seed_lesson(&pool, teacher_id, "Introduction to Calculus").await;
        seed_lesson(&pool, teacher_id, "Algebra Essentials").await;
        seed_lesson(&pool, teacher_id, "CALCULUS drills").await;

        let page = get_all_lessons(
            &pool,
            LessonFilter {
                search_term: Some("Calculus".to_string()),
                teacher_id: None,
            },
            Pagination::default(),
        )
        .await
        .unwrap();
        assert_eq!(page.meta.total, 2);
        assert_eq!(page.data.len(), 2);
        assert!(page
            .data
            .iter()
            .all(|l| l.title.to_lowercase().contains("calculus")));
        // default ordering is newest first
        assert!(page.data[0].created_at >= page.data[1].created_at);
    }

    #[tokio::test]
    async fn listing_paginates_and_filters_by_teacher() {
        let pool = memory_pool().await;
        let alice = seed_teacher(&pool, "Alice Johnson").await;
        let bob = seed_teacher(&pool, "Bob Williams").await;
        for i in 0..3 {
            seed_lesson(&pool, alice, &format!("Lesson {i}")).await;
        }
        seed_lesson(&pool, bob, "Lesson X").await;

        let page = get_all_lessons(
            &pool,
            LessonFilter {
                search_term: None,
                teacher_id: Some(alice),
            },
            Pagination {
                page: 1,
                limit: 2,
                ..Pagination::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(page.meta.total, 3);
        assert_eq!(page.meta.limit, 2);
        assert_eq!(page.data.len(), 2);
        assert!(page.data.iter().all(|l| l.teacher_id == alice));
    }

    #[tokio::test]
    async fn update_merges_partial_input() {
        let pool = memory_pool().await;
        let teacher_id = seed_teacher(&pool, "Diana Carter").await;
        let lesson = seed_lesson(&pool, teacher_id, "States of Matter").await;

        let updated = update_lesson(
            &pool,
            lesson.id,
            UpdateLesson {
                title: Some("States of Matter, revised".to_string()),
                ..UpdateLesson::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.title, "States of Matter, revised");
        assert_eq!(updated.description, lesson.description);
        assert_eq!(updated.video_url, lesson.video_url);
    }

    #[tokio::test]
    async fn delete_cascades_to_children() {
        let pool = memory_pool().await;
        let teacher_id = seed_teacher(&pool, "Edward Smith").await;
        let student_id = seed_student(&pool, "Student B").await;
        let lesson = seed_lesson(&pool, teacher_id, "Water Cycle").await;
        seed_question(&pool, lesson.id, "B").await;
        let task_id = seed_task(&pool, lesson.id).await;
        crate::task::submit_task_response(&pool, task_id, student_id, "done")
            .await
            .unwrap();
        record_lesson_view(&pool, lesson.id, student_id).await.unwrap();

        delete_lesson(&pool, lesson.id).await.unwrap();
        for table in ["quiz_question", "lesson_task", "lesson_view"] {
            let count: i64 =
                sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table} WHERE lesson_id = ?"))
                    .bind(lesson.id)
                    .fetch_one(&pool)
                    .await
                    .unwrap();
            assert_eq!(count, 0, "{table} rows should cascade");
        }
        let submissions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM task_submission")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(submissions, 0);
    }
}
