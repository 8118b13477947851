use std::collections::BTreeMap;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

use crate::error::Error;
use crate::lesson::{
    self, CreateLesson, Lesson, LessonDetail, LessonFilter, LessonPage, Pagination, SortField,
    SortOrder, UpdateLesson,
};
use crate::quiz::{self, QuizResult};
use crate::stats::{self, StudentEngagement, StudentProgress};
use crate::task::{self, SubmissionListing};

use super::response::ApiResponse;

#[utoipa::path(
    context_path = "/api/lessons",
    path = "/create",
    method(post),
    request_body = CreateLesson,
    responses(
        (status = 201, description = "Lesson created successfully", body = Lesson)
    )
)]
pub async fn create_lesson(
    State(database): State<SqlitePool>,
    Json(input): Json<CreateLesson>,
) -> Result<ApiResponse<Lesson>, Error> {
    let lesson = lesson::create_lesson(&database, input).await?;
    Ok(ApiResponse::ok(
        StatusCode::CREATED,
        "Lesson created successfully",
        lesson,
    ))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct LessonListQuery {
    pub search_term: Option<String>,
    pub teacher_id: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

impl LessonListQuery {
    fn into_parts(self) -> (LessonFilter, Pagination) {
        let defaults = Pagination::default();
        (
            LessonFilter {
                search_term: self.search_term,
                teacher_id: self.teacher_id,
            },
            Pagination {
                page: self.page.unwrap_or(defaults.page),
                limit: self.limit.unwrap_or(defaults.limit),
                sort_by: self.sort_by.unwrap_or(defaults.sort_by),
                sort_order: self.sort_order.unwrap_or(defaults.sort_order),
            },
        )
    }
}

#[utoipa::path(
    context_path = "/api/lessons",
    path = "/",
    method(get),
    params(LessonListQuery),
    responses(
        (status = 200, description = "Lessons retrieved successfully", body = LessonPage)
    )
)]
pub async fn get_all_lessons(
    State(database): State<SqlitePool>,
    Query(query): Query<LessonListQuery>,
) -> Result<ApiResponse<LessonPage>, Error> {
    let (filter, pagination) = query.into_parts();
    let page = lesson::get_all_lessons(&database, filter, pagination).await?;
    Ok(ApiResponse::ok(
        StatusCode::OK,
        "Lessons retrieved successfully",
        page,
    ))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct SingleLessonQuery {
    /// Record a view and narrow task submissions to this student.
    pub student_id: Option<i64>,
}

#[utoipa::path(
    context_path = "/api/lessons",
    path = "/{id}",
    method(get),
    params(
        ("id" = i64, Path, description = "Lesson id"),
        SingleLessonQuery
    ),
    responses(
        (status = 200, description = "Lesson retrieved successfully", body = LessonDetail),
        (status = 404, description = "Lesson not found")
    )
)]
pub async fn get_single_lesson(
    State(database): State<SqlitePool>,
    Path(id): Path<i64>,
    Query(query): Query<SingleLessonQuery>,
) -> Result<ApiResponse<LessonDetail>, Error> {
    let detail = lesson::get_single_lesson(&database, id, query.student_id).await?;
    Ok(ApiResponse::ok(
        StatusCode::OK,
        "Lesson retrieved successfully",
        detail,
    ))
}

#[utoipa::path(
    context_path = "/api/lessons",
    path = "/{id}",
    method(put),
    request_body = UpdateLesson,
    params(("id" = i64, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "Lesson updated successfully", body = Lesson),
        (status = 404, description = "Lesson not found")
    )
)]
pub async fn update_lesson(
    State(database): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateLesson>,
) -> Result<ApiResponse<Lesson>, Error> {
    let lesson = lesson::update_lesson(&database, id, input).await?;
    Ok(ApiResponse::ok(
        StatusCode::OK,
        "Lesson updated successfully",
        lesson,
    ))
}

#[utoipa::path(
    context_path = "/api/lessons",
    path = "/{id}",
    method(delete),
    params(("id" = i64, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "Lesson deleted successfully"),
        (status = 404, description = "Lesson not found")
    )
)]
pub async fn delete_lesson(
    State(database): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<()>, Error> {
    lesson::delete_lesson(&database, id).await?;
    Ok(ApiResponse::ok_empty(
        StatusCode::OK,
        "Lesson deleted successfully",
    ))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    pub student_id: i64,
    /// Chosen option per question id, e.g. {"1": "A", "2": "C"}.
    pub answers: BTreeMap<i64, String>,
}

#[utoipa::path(
    context_path = "/api/lessons",
    path = "/lesson/{lesson_id}/quiz",
    method(post),
    request_body = SubmitQuizRequest,
    params(("lesson_id" = i64, Path, description = "Lesson id")),
    responses(
        (status = 201, description = "Quiz submitted successfully", body = QuizResult),
        (status = 400, description = "Lesson has no quiz questions"),
        (status = 404, description = "Lesson not found")
    )
)]
pub async fn submit_quiz_attempt(
    State(database): State<SqlitePool>,
    Path(lesson_id): Path<i64>,
    Json(request): Json<SubmitQuizRequest>,
) -> Result<ApiResponse<QuizResult>, Error> {
    let result =
        quiz::submit_quiz_attempt(&database, lesson_id, request.student_id, request.answers)
            .await?;
    Ok(ApiResponse::ok(
        StatusCode::CREATED,
        "Quiz submitted successfully",
        result,
    ))
}

#[utoipa::path(
    context_path = "/api/lessons",
    path = "/lesson/{lesson_id}/engagement",
    method(get),
    params(("lesson_id" = i64, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "Engagement retrieved successfully", body = Vec<StudentEngagement>)
    )
)]
pub async fn get_lesson_engagement(
    State(database): State<SqlitePool>,
    Path(lesson_id): Path<i64>,
) -> Result<ApiResponse<Vec<StudentEngagement>>, Error> {
    let rows = stats::get_lesson_engagement(&database, lesson_id).await?;
    Ok(ApiResponse::ok(
        StatusCode::OK,
        "Engagement retrieved successfully",
        rows,
    ))
}

#[utoipa::path(
    context_path = "/api/lessons",
    path = "/lesson/{lesson_id}/progress-summary",
    method(get),
    params(("lesson_id" = i64, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "Progress retrieved successfully", body = Vec<StudentProgress>)
    )
)]
pub async fn get_student_progress_summary(
    State(database): State<SqlitePool>,
    Path(lesson_id): Path<i64>,
) -> Result<ApiResponse<Vec<StudentProgress>>, Error> {
    let rows = stats::get_student_progress_summary(&database, lesson_id).await?;
    Ok(ApiResponse::ok(
        StatusCode::OK,
        "Progress retrieved successfully",
        rows,
    ))
}

#[utoipa::path(
    context_path = "/api/lessons",
    path = "/lesson/{lesson_id}/task-submissions",
    method(get),
    params(("lesson_id" = i64, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "Submissions retrieved successfully", body = Vec<SubmissionListing>)
    )
)]
pub async fn get_task_submissions_for_lesson(
    State(database): State<SqlitePool>,
    Path(lesson_id): Path<i64>,
) -> Result<ApiResponse<Vec<SubmissionListing>>, Error> {
    let rows = task::get_task_submissions_for_lesson(&database, lesson_id).await?;
    Ok(ApiResponse::ok(
        StatusCode::OK,
        "Submissions retrieved successfully",
        rows,
    ))
}

pub fn get_lessons_scope() -> Router<SqlitePool> {
    Router::new()
        .route("/create", post(create_lesson))
        .route("/", get(get_all_lessons))
        .route(
            "/{id}",
            get(get_single_lesson)
                .put(update_lesson)
                .delete(delete_lesson),
        )
        .route("/lesson/{lesson_id}/quiz", post(submit_quiz_attempt))
        .route("/lesson/{lesson_id}/engagement", get(get_lesson_engagement))
        .route(
            "/lesson/{lesson_id}/progress-summary",
            get(get_student_progress_summary),
        )
        .route(
            "/lesson/{lesson_id}/task-submissions",
            get(get_task_submissions_for_lesson),
        )
}
