use axum::Router;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::routing::{post, put};
use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::error::Error;
use crate::task::{self, TaskSubmission};

use super::response::ApiResponse;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTaskRequest {
    pub student_id: i64,
    pub content: String,
}

#[utoipa::path(
    context_path = "/api/lessons",
    path = "/tasks/submission/{task_id}",
    method(post),
    request_body = SubmitTaskRequest,
    params(("task_id" = i64, Path, description = "Task id")),
    responses(
        (status = 201, description = "Task submitted successfully", body = TaskSubmission),
        (status = 400, description = "Already submitted"),
        (status = 404, description = "Task not found")
    )
)]
pub async fn submit_task_response(
    State(database): State<SqlitePool>,
    Path(task_id): Path<i64>,
    Json(request): Json<SubmitTaskRequest>,
) -> Result<ApiResponse<TaskSubmission>, Error> {
    let submission =
        task::submit_task_response(&database, task_id, request.student_id, &request.content)
            .await?;
    Ok(ApiResponse::ok(
        StatusCode::CREATED,
        "Task submitted successfully",
        submission,
    ))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMarkRequest {
    pub mark: i64,
}

#[utoipa::path(
    context_path = "/api/lessons",
    path = "/submissions/{submission_id}/mark",
    method(put),
    request_body = UpdateMarkRequest,
    params(("submission_id" = i64, Path, description = "Submission id")),
    responses(
        (status = 200, description = "Mark updated successfully", body = TaskSubmission),
        (status = 404, description = "Submission not found")
    )
)]
pub async fn update_task_mark(
    State(database): State<SqlitePool>,
    Path(submission_id): Path<i64>,
    Json(request): Json<UpdateMarkRequest>,
) -> Result<ApiResponse<TaskSubmission>, Error> {
    let submission = task::update_task_mark(&database, submission_id, request.mark).await?;
    Ok(ApiResponse::ok(
        StatusCode::OK,
        "Mark updated successfully",
        submission,
    ))
}

pub fn get_tasks_scope() -> Router<SqlitePool> {
    Router::new()
        .route("/tasks/submission/{task_id}", post(submit_task_response))
        .route("/submissions/{submission_id}/mark", put(update_task_mark))
}
