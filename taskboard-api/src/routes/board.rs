/// Board endpoints
///
/// # Endpoints
///
/// - `GET /v1/projects/:pk/board` - Tasks grouped into the four status columns
/// - `POST /v1/projects/:pk/board/move` - Drag-and-drop a task into a column
///
/// A move with a missing or unknown status code leaves the task untouched
/// and still answers 200 with the task.

use crate::{app::AppState, error::ApiResult, routes::project_for};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{authorization::ProjectAction, middleware::AuthContext},
    board::{load_board, move_task_in_project, BoardColumn},
    models::task::Task,
};

/// Board response
#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub project_id: i64,
    pub columns: Vec<BoardColumn>,
}

/// Drag-and-drop move
#[derive(Debug, Deserialize)]
pub struct BoardMoveRequest {
    pub task_id: i64,

    /// Target column code, e.g. `DONE`
    #[serde(default)]
    pub status: Option<String>,
}

/// Returns the project's board
pub async fn get_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(pk): Path<i64>,
) -> ApiResult<Json<BoardResponse>> {
    let project = project_for(&state.db, &auth, pk, ProjectAction::View).await?;
    let columns = load_board(&state.db, project.id).await?;

    Ok(Json(BoardResponse {
        project_id: project.id,
        columns,
    }))
}

/// Moves a task of this project to the end of a column
pub async fn move_on_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(pk): Path<i64>,
    Json(req): Json<BoardMoveRequest>,
) -> ApiResult<Json<Task>> {
    let project = project_for(&state.db, &auth, pk, ProjectAction::MoveTask).await?;
    let task = move_task_in_project(&state.db, project.id, req.task_id, req.status.as_deref()).await?;

    Ok(Json(task))
}
