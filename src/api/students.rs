use axum::Router;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::error::Error;
use crate::quiz::{self, AttemptListing};
use crate::stats::{self, StudentDashboard};
use crate::student::{self, StudentInfo};
use crate::task::{self, SubmissionListing};

use super::response::ApiResponse;

#[utoipa::path(
    context_path = "/api/lessons",
    path = "/students/{student_id}/quizzes",
    method(get),
    params(("student_id" = i64, Path, description = "Student id")),
    responses(
        (status = 200, description = "Attempts retrieved successfully", body = Vec<AttemptListing>)
    )
)]
pub async fn get_quiz_attempts_by_student(
    State(database): State<SqlitePool>,
    Path(student_id): Path<i64>,
) -> Result<ApiResponse<Vec<AttemptListing>>, Error> {
    let attempts = quiz::get_quiz_attempts_by_student(&database, student_id).await?;
    Ok(ApiResponse::ok(
        StatusCode::OK,
        "Attempts retrieved successfully",
        attempts,
    ))
}

#[utoipa::path(
    context_path = "/api/lessons",
    path = "/students/{student_id}/quizzes/{lesson_id}",
    method(get),
    params(
        ("student_id" = i64, Path, description = "Student id"),
        ("lesson_id" = i64, Path, description = "Lesson id")
    ),
    responses(
        (status = 200, description = "Attempts retrieved successfully", body = Vec<AttemptListing>)
    )
)]
pub async fn get_quiz_attempts_for_student(
    State(database): State<SqlitePool>,
    Path((student_id, lesson_id)): Path<(i64, i64)>,
) -> Result<ApiResponse<Vec<AttemptListing>>, Error> {
    let attempts = quiz::get_quiz_attempts_for_student(&database, lesson_id, student_id).await?;
    Ok(ApiResponse::ok(
        StatusCode::OK,
        "Attempts retrieved successfully",
        attempts,
    ))
}

#[utoipa::path(
    context_path = "/api/lessons",
    path = "/students/{student_id}/tasks",
    method(get),
    params(("student_id" = i64, Path, description = "Student id")),
    responses(
        (status = 200, description = "Submissions retrieved successfully", body = Vec<SubmissionListing>)
    )
)]
pub async fn get_task_submissions_by_student(
    State(database): State<SqlitePool>,
    Path(student_id): Path<i64>,
) -> Result<ApiResponse<Vec<SubmissionListing>>, Error> {
    let submissions = task::get_task_submissions_by_student(&database, student_id).await?;
    Ok(ApiResponse::ok(
        StatusCode::OK,
        "Submissions retrieved successfully",
        submissions,
    ))
}

#[utoipa::path(
    context_path = "/api/lessons",
    path = "/students/{student_id}/dashboard-stats",
    method(get),
    params(("student_id" = i64, Path, description = "Student id")),
    responses(
        (status = 200, description = "Stats retrieved successfully", body = StudentDashboard)
    )
)]
pub async fn get_student_dashboard_stats(
    State(database): State<SqlitePool>,
    Path(student_id): Path<i64>,
) -> Result<ApiResponse<StudentDashboard>, Error> {
    let dashboard = stats::get_student_dashboard_stats(&database, student_id).await?;
    Ok(ApiResponse::ok(
        StatusCode::OK,
        "Stats retrieved successfully",
        dashboard,
    ))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    pub name: String,
    pub email: String,
}

#[utoipa::path(
    context_path = "/api/people",
    path = "/students",
    method(get),
    responses(
        (status = 200, description = "Students retrieved successfully", body = Vec<StudentInfo>)
    )
)]
pub async fn get_student_list(
    State(database): State<SqlitePool>,
) -> Result<ApiResponse<Vec<StudentInfo>>, Error> {
    let students = student::get_student_list(&database).await?;
    Ok(ApiResponse::ok(
        StatusCode::OK,
        "Students retrieved successfully",
        students,
    ))
}

#[utoipa::path(
    context_path = "/api/people",
    path = "/students",
    method(post),
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created successfully", body = i64)
    )
)]
pub async fn create_student(
    State(database): State<SqlitePool>,
    Json(request): Json<CreateStudentRequest>,
) -> Result<ApiResponse<i64>, Error> {
    let id = student::create_student(&database, &request.name, &request.email).await?;
    Ok(ApiResponse::ok(
        StatusCode::CREATED,
        "Student created successfully",
        id,
    ))
}

pub fn get_students_scope() -> Router<SqlitePool> {
    Router::new()
        .route(
            "/students/{student_id}/quizzes",
            get(get_quiz_attempts_by_student),
        )
        .route(
            "/students/{student_id}/quizzes/{lesson_id}",
            get(get_quiz_attempts_for_student),
        )
        .route(
            "/students/{student_id}/tasks",
            get(get_task_submissions_by_student),
        )
        .route(
            "/students/{student_id}/dashboard-stats",
            get(get_student_dashboard_stats),
        )
}

pub fn get_student_people_scope() -> Router<SqlitePool> {
    Router::new().route("/students", get(get_student_list).post(create_student))
}
