/// Task endpoints
///
/// # Endpoints
///
/// - `GET /v1/projects/:project_pk/tasks` - A project's tasks in board order
/// - `POST /v1/projects/:project_pk/tasks` - Create a task in a project
/// - `GET /v1/tasks` - Tasks across all of the caller's projects
/// - `GET /v1/tasks/:pk` - One task
/// - `PUT /v1/tasks/:pk` - Replace a task's fields
/// - `DELETE /v1/tasks/:pk` - Delete a task
/// - `POST /v1/tasks/:pk/move` - Move a task to the end of a column
///
/// # Filters
///
/// Listings accept `status` (e.g. `IN_PROGRESS`), `priority` (1-3) and
/// `assignee` (user id); the global listing also takes `project`.
///
/// `ordering` is one of `due_date`, `updated_at` or `order`, with a leading
/// `-` for descending. Without it tasks come back in board order.
///
/// Every endpoint requires a membership in the task's project.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::resolved_project,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use taskboard_shared::{
    auth::{authorization::ProjectAction, middleware::AuthContext, resolver::RouteParams},
    board::{self, move_task},
    error::TrackerError,
    models::task::{CreateTask, Task, TaskFilter, TaskOrdering, TaskPriority, TaskStatus, UpdateTask},
};
use tracing::info;
use validator::Validate;

/// Listing filters
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub project: Option<i64>,
    pub status: Option<String>,
    pub priority: Option<i16>,
    pub assignee: Option<i64>,
    pub ordering: Option<String>,
}

impl TaskListQuery {
    /// Converts raw query values into a typed filter
    ///
    /// Empty `status` and `ordering` values mean no filter and board order.
    pub fn into_filter(self) -> ApiResult<TaskFilter> {
        let status = match self.status.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            None => None,
            Some(code) => Some(
                TaskStatus::parse(code)
                    .ok_or_else(|| ApiError::invalid_field("status", format!("Unknown task status '{}'", code)))?,
            ),
        };

        let priority = self
            .priority
            .map(TaskPriority::try_from)
            .transpose()
            .map_err(|message| ApiError::invalid_field("priority", message))?;

        let ordering = match self.ordering.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            None => TaskOrdering::default(),
            Some(code) => TaskOrdering::parse(code).ok_or_else(|| {
                ApiError::invalid_field(
                    "ordering",
                    format!("Cannot order by '{}'; use due_date, updated_at or order", code),
                )
            })?,
        };

        Ok(TaskFilter {
            project: self.project,
            status,
            priority,
            assignee: self.assignee,
            ordering,
        })
    }
}

/// Create a task
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: TaskPriority,

    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<i64>,
}

/// Replace a task's fields
///
/// A `status` different from the current one moves the task to the end of
/// that column.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub status: Option<TaskStatus>,

    #[serde(default)]
    pub priority: TaskPriority,

    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<i64>,
}

/// Move a task
#[derive(Debug, Deserialize)]
pub struct MoveTaskRequest {
    #[serde(default)]
    pub status: Option<String>,
}

/// Loads a task after checking the caller may act on its project
async fn task_for(state: &AppState, auth: &AuthContext, pk: i64, action: ProjectAction) -> ApiResult<Task> {
    let project = resolved_project(&state.db, auth, RouteParams::pk(pk), action).await?;

    let task = Task::find_in_project(&state.db, project.id, pk)
        .await?
        .ok_or_else(|| TrackerError::not_found("task"))?;

    Ok(task)
}

/// Lists one project's tasks
pub async fn list_project_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_pk): Path<i64>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let filter = query.into_filter()?;
    let project = resolved_project(
        &state.db,
        &auth,
        RouteParams::project_pk(project_pk),
        ProjectAction::ViewTasks,
    )
    .await?;

    let tasks = Task::list_by_project(&state.db, project.id, &filter).await?;
    Ok(Json(tasks))
}

/// Creates a task in a project
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_pk): Path<i64>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let project = resolved_project(
        &state.db,
        &auth,
        RouteParams::project_pk(project_pk),
        ProjectAction::CreateTask,
    )
    .await?;
    req.validate()?;

    let task = Task::create(
        &state.db,
        CreateTask {
            project_id: project.id,
            title: req.title.trim().to_string(),
            description: req.description,
            status: req.status,
            priority: req.priority,
            due_date: req.due_date,
            assignee_id: req.assignee_id,
        },
    )
    .await?;

    info!(task_id = task.id, project_id = project.id, user_id = auth.user_id, "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// Lists tasks from every project the caller is a member of
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let filter = query.into_filter()?;
    let tasks = Task::list_for_member(&state.db, auth.user_id, &filter).await?;

    Ok(Json(tasks))
}

/// Returns one task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(pk): Path<i64>,
) -> ApiResult<Json<Task>> {
    let task = task_for(&state, &auth, pk, ProjectAction::ViewTasks).await?;
    Ok(Json(task))
}

/// Replaces a task's fields, moving it when the status changes
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(pk): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let task = task_for(&state, &auth, pk, ProjectAction::EditTask).await?;
    req.validate()?;

    let data = UpdateTask {
        title: req.title.trim().to_string(),
        description: req.description,
        priority: req.priority,
        due_date: req.due_date,
        assignee_id: req.assignee_id,
    };
    let updated = board::update_task(&state.db, &task, data, req.status).await?;

    info!(task_id = updated.id, user_id = auth.user_id, "Task updated");
    Ok(Json(updated))
}

/// Deletes a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(pk): Path<i64>,
) -> ApiResult<StatusCode> {
    let task = task_for(&state, &auth, pk, ProjectAction::DeleteTask).await?;

    if !Task::delete(&state.db, task.id).await? {
        return Err(TrackerError::not_found("task").into());
    }

    info!(task_id = task.id, project_id = task.project_id, user_id = auth.user_id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Moves a task to the end of the requested column
pub async fn move_task_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(pk): Path<i64>,
    Json(req): Json<MoveTaskRequest>,
) -> ApiResult<Json<Task>> {
    let task = task_for(&state, &auth, pk, ProjectAction::MoveTask).await?;
    let moved = move_task(&state.db, &task, req.status.as_deref()).await?;

    Ok(Json(moved))
}
