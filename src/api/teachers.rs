use axum::Router;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::error::Error;
use crate::stats::{self, LessonStats, TeacherDashboard};
use crate::teacher::{self, TeacherInfo};

use super::response::ApiResponse;

#[utoipa::path(
    context_path = "/api/lessons",
    path = "/teachers/{teacher_id}/lessons",
    method(get),
    params(("teacher_id" = i64, Path, description = "Teacher id")),
    responses(
        (status = 200, description = "Lessons retrieved successfully", body = Vec<LessonStats>)
    )
)]
pub async fn get_teacher_lessons_with_stats(
    State(database): State<SqlitePool>,
    Path(teacher_id): Path<i64>,
) -> Result<ApiResponse<Vec<LessonStats>>, Error> {
    let lessons = stats::get_teacher_lessons_with_stats(&database, teacher_id).await?;
    Ok(ApiResponse::ok(
        StatusCode::OK,
        "Lessons retrieved successfully",
        lessons,
    ))
}

#[utoipa::path(
    context_path = "/api/lessons",
    path = "/teachers/{teacher_id}/dashboard-stats",
    method(get),
    params(("teacher_id" = i64, Path, description = "Teacher id")),
    responses(
        (status = 200, description = "Stats retrieved successfully", body = TeacherDashboard)
    )
)]
pub async fn get_teacher_dashboard_stats(
    State(database): State<SqlitePool>,
    Path(teacher_id): Path<i64>,
) -> Result<ApiResponse<TeacherDashboard>, Error> {
    let dashboard = stats::get_teacher_dashboard_stats(&database, teacher_id).await?;
    Ok(ApiResponse::ok(
        StatusCode::OK,
        "Stats retrieved successfully",
        dashboard,
    ))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeacherRequest {
    pub name: String,
    pub email: String,
}

#[utoipa::path(
    context_path = "/api/people",
    path = "/teachers",
    method(get),
    responses(
        (status = 200, description = "Teachers retrieved successfully", body = Vec<TeacherInfo>)
    )
)]
pub async fn get_teacher_list(
    State(database): State<SqlitePool>,
) -> Result<ApiResponse<Vec<TeacherInfo>>, Error> {
    let teachers = teacher::get_teacher_list(&database).await?;
    Ok(ApiResponse::ok(
        StatusCode::OK,
        "Teachers retrieved successfully",
        teachers,
    ))
}

#[utoipa::path(
    context_path = "/api/people",
    path = "/teachers",
    method(post),
    request_body = CreateTeacherRequest,
    responses(
        (status = 201, description = "Teacher created successfully", body = i64)
    )
)]
pub async fn create_teacher(
    State(database): State<SqlitePool>,
    Json(request): Json<CreateTeacherRequest>,
) -> Result<ApiResponse<i64>, Error> {
    let id = teacher::create_teacher(&database, &request.name, &request.email).await?;
    Ok(ApiResponse::ok(
        StatusCode::CREATED,
        "Teacher created successfully",
        id,
    ))
}

pub fn get_teachers_scope() -> Router<SqlitePool> {
    Router::new()
        .route(
            "/teachers/{teacher_id}/lessons",
            get(get_teacher_lessons_with_stats),
        )
        .route(
            "/teachers/{teacher_id}/dashboard-stats",
            get(get_teacher_dashboard_stats),
        )
}

pub fn get_teacher_people_scope() -> Router<SqlitePool> {
    Router::new().route("/teachers", get(get_teacher_list).post(create_teacher))
}
