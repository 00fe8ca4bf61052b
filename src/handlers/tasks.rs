use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use compute::tasks::{self, DEFAULT_PAGE_SIZE};
use model::entities::{task, task_action};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::identity::Identity;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for creating a task
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Request body for recording an action on a task
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RecordActionRequest {
    pub description: String,
    /// Path to an uploaded attachment, if any
    pub attachment: Option<String>,
}

/// Task response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_by: i32,
    pub created_at: String,
    pub started_by: Option<i32>,
    pub started_at: Option<String>,
    pub finished_by: Option<i32>,
    pub finished_at: Option<String>,
}

impl From<task::Model> for TaskResponse {
    fn from(model: task::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            status: model.status.as_str().to_string(),
            created_by: model.created_by,
            created_at: model.created_at.to_rfc3339(),
            started_by: model.started_by,
            started_at: model.started_at.map(|t| t.to_rfc3339()),
            finished_by: model.finished_by,
            finished_at: model.finished_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Task action response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskActionResponse {
    pub id: i32,
    pub task_id: i32,
    pub description: String,
    pub attachment: Option<String>,
    pub recorded_by: i32,
    pub recorded_at: String,
}

impl From<task_action::Model> for TaskActionResponse {
    fn from(model: task_action::Model) -> Self {
        Self {
            id: model.id,
            task_id: model.task_id,
            description: model.description,
            attachment: model.attachment,
            recorded_by: model.recorded_by,
            recorded_at: model.recorded_at.to_rfc3339(),
        }
    }
}

/// Kanban board response: open columns in full, finished column paged
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskBoardResponse {
    pub not_started: Vec<TaskResponse>,
    pub started: Vec<TaskResponse>,
    pub finished: Vec<TaskResponse>,
    pub finished_total: u64,
    pub finished_pages: u64,
    pub page: u64,
}

/// Query parameters for the task board
#[derive(Debug, Deserialize, ToSchema)]
pub struct BoardQuery {
    /// 1-based page of the finished column
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    /// Focus on one involved user (management only)
    pub user: Option<i32>,
}

/// Get the task board
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    tag = "tasks",
    params(
        ("page" = Option<u64>, Query, description = "Finished column page, 1-based"),
        ("page_size" = Option<u64>, Query, description = "Finished column page size, default 10"),
        ("user" = Option<i32>, Query, description = "Focus on one involved user (management only)"),
    ),
    responses(
        (status = 200, description = "Task board retrieved successfully", body = ApiResponse<TaskBoardResponse>)
    )
)]
#[instrument(skip(state, identity))]
pub async fn get_task_board(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<BoardQuery>,
) -> Result<Json<ApiResponse<TaskBoardResponse>>, ApiError> {
    let scope = identity.scope(None);
    let board = tasks::board(
        &state.db,
        &scope,
        query.user,
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    )
    .await?;
    let response = TaskBoardResponse {
        not_started: board.not_started.into_iter().map(TaskResponse::from).collect(),
        started: board.started.into_iter().map(TaskResponse::from).collect(),
        finished: board.finished.into_iter().map(TaskResponse::from).collect(),
        finished_total: board.finished_total,
        finished_pages: board.finished_pages,
        page: board.page,
    };
    Ok(Json(ApiResponse::new(
        response,
        "Task board retrieved successfully",
    )))
}

/// Create a task
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    tag = "tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created successfully", body = ApiResponse<TaskResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity, request))]
pub async fn create_task(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TaskResponse>>), ApiError> {
    let task = tasks::create(&state.db, &identity.user, request.title, request.description).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            TaskResponse::from(task),
            "Task created successfully",
        )),
    ))
}

/// Get a single task
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{task_id}",
    tag = "tasks",
    params(("task_id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task retrieved successfully", body = ApiResponse<TaskResponse>),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity))]
pub async fn get_task(
    State(state): State<AppState>,
    identity: Identity,
    Path(task_id): Path<i32>,
) -> Result<Json<ApiResponse<TaskResponse>>, ApiError> {
    let scope = identity.scope(None);
    let task = tasks::get_task(&state.db, &scope, task_id).await?;
    Ok(Json(ApiResponse::new(
        TaskResponse::from(task),
        "Task retrieved successfully",
    )))
}

/// Start a task
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{task_id}/start",
    tag = "tasks",
    params(("task_id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task started", body = ApiResponse<TaskResponse>),
        (status = 409, description = "Task is not in NOT_STARTED", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity))]
pub async fn start_task(
    State(state): State<AppState>,
    identity: Identity,
    Path(task_id): Path<i32>,
) -> Result<Json<ApiResponse<TaskResponse>>, ApiError> {
    let scope = identity.scope(None);
    let task = tasks::start(&state.db, &scope, &identity.user, task_id).await?;
    Ok(Json(ApiResponse::new(TaskResponse::from(task), "Task started")))
}

/// Finish a task
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{task_id}/finish",
    tag = "tasks",
    params(("task_id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task finished", body = ApiResponse<TaskResponse>),
        (status = 409, description = "Task is not in STARTED", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity))]
pub async fn finish_task(
    State(state): State<AppState>,
    identity: Identity,
    Path(task_id): Path<i32>,
) -> Result<Json<ApiResponse<TaskResponse>>, ApiError> {
    let scope = identity.scope(None);
    let task = tasks::finish(&state.db, &scope, &identity.user, task_id).await?;
    Ok(Json(ApiResponse::new(TaskResponse::from(task), "Task finished")))
}

/// Record an action on a task. Starts a NOT_STARTED task automatically.
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{task_id}/actions",
    tag = "tasks",
    params(("task_id" = i32, Path, description = "Task ID")),
    request_body = RecordActionRequest,
    responses(
        (status = 201, description = "Action recorded", body = ApiResponse<TaskActionResponse>),
        (status = 400, description = "Task is finished", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity, request))]
pub async fn create_task_action(
    State(state): State<AppState>,
    identity: Identity,
    Path(task_id): Path<i32>,
    Json(request): Json<RecordActionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TaskActionResponse>>), ApiError> {
    let scope = identity.scope(None);
    let (_, action) = tasks::record_action(
        &state.db,
        &scope,
        &identity.user,
        task_id,
        request.description,
        request.attachment,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            TaskActionResponse::from(action),
            "Action recorded",
        )),
    ))
}

/// List a task's actions, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{task_id}/actions",
    tag = "tasks",
    params(("task_id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Actions retrieved successfully", body = ApiResponse<Vec<TaskActionResponse>>)
    )
)]
#[instrument(skip(state, identity))]
pub async fn get_task_actions(
    State(state): State<AppState>,
    identity: Identity,
    Path(task_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<TaskActionResponse>>>, ApiError> {
    let scope = identity.scope(None);
    let actions = tasks::list_actions(&state.db, &scope, task_id).await?;
    Ok(Json(ApiResponse::new(
        actions.into_iter().map(TaskActionResponse::from).collect::<Vec<_>>(),
        "Actions retrieved successfully",
    )))
}
