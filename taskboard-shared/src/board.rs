/// Task ordering engine and board columns
///
/// A project's board has one column per [`TaskStatus`]. Inside a column tasks
/// are sorted by `order`. Moving a task (drag and drop, the move endpoint, or
/// a status change in a regular edit) always appends it to the end of the
/// target column:
///
/// ```text
/// order = max(order in target column, or 0 when empty) + 1
/// ```
///
/// Other tasks are never renumbered, so positions only grow. The read of the
/// column maximum and the write of the new position are one atomic store
/// operation ([`ProjectStore::append_to_column`], or
/// [`ProjectStore::update_task`] when an edit changes the column). A column
/// whose last task sits at `i32::MAX` accepts no more moves.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::board::move_task;
/// use taskboard_shared::models::task::Task;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, task: Task) -> Result<(), Box<dyn std::error::Error>> {
/// let moved = move_task(&pool, &task, Some("DONE")).await?;
/// assert!(moved.order >= 1);
///
/// // Unknown codes leave the task where it is
/// let same = move_task(&pool, &moved, Some("ARCHIVED")).await?;
/// assert_eq!(same.order, moved.order);
/// # Ok(())
/// # }
/// ```

use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, info};

use crate::error::{TrackerError, TrackerResult};
use crate::models::task::{Task, TaskStatus, UpdateTask};
use crate::store::ProjectStore;

/// Position for a task appended to a column whose highest position is `max`
///
/// `None` when the column already holds `i32::MAX`; stores report that as
/// [`StoreError::ColumnFull`](crate::store::StoreError::ColumnFull).
pub fn next_order(max: Option<i32>) -> Option<i32> {
    max.unwrap_or(0).checked_add(1)
}

/// Moves a task to the end of the column named by `new_status`
///
/// An absent, empty or unknown status code is not an error: the task is
/// returned unchanged and nothing is written.
///
/// # Errors
///
/// `TrackerError::NotFound` if the task was deleted in the meantime
pub async fn move_task<S>(store: &S, task: &Task, new_status: Option<&str>) -> TrackerResult<Task>
where
    S: ProjectStore + ?Sized,
{
    match new_status.and_then(TaskStatus::parse) {
        Some(status) => move_task_to(store, task, status).await,
        None => {
            debug!(task_id = task.id, requested = ?new_status, "Ignoring move to unknown status");
            Ok(task.clone())
        }
    }
}

/// Moves a task to the end of `status`
///
/// Moving into the column the task already sits in still gives it a new,
/// higher position.
pub async fn move_task_to<S>(store: &S, task: &Task, status: TaskStatus) -> TrackerResult<Task>
where
    S: ProjectStore + ?Sized,
{
    let moved = store
        .append_to_column(task.id, status)
        .await?
        .ok_or_else(|| TrackerError::not_found("task"))?;

    info!(
        task_id = moved.id,
        project_id = moved.project_id,
        from = task.status.as_str(),
        to = moved.status.as_str(),
        order = moved.order,
        "Task moved"
    );
    Ok(moved)
}

/// Replaces a task's descriptive fields, appending it to `status` when that
/// differs from its current column
///
/// The edit and the append are one store operation: when the append fails
/// the edited fields are not kept either.
///
/// # Errors
///
/// - `TrackerError::NotFound` if the task was deleted in the meantime
/// - `TrackerError::Store` with
///   [`StoreError::ColumnFull`](crate::store::StoreError::ColumnFull) when the target
///   column has no position left
pub async fn update_task<S>(
    store: &S,
    task: &Task,
    data: UpdateTask,
    status: Option<TaskStatus>,
) -> TrackerResult<Task>
where
    S: ProjectStore + ?Sized,
{
    let updated = store
        .update_task(task.id, data, status)
        .await?
        .ok_or_else(|| TrackerError::not_found("task"))?;

    if updated.status != task.status {
        info!(
            task_id = updated.id,
            project_id = updated.project_id,
            from = task.status.as_str(),
            to = updated.status.as_str(),
            order = updated.order,
            "Task moved"
        );
    }
    Ok(updated)
}

/// Board drag-and-drop entry point
///
/// Looks the task up inside `project_id` first, so a task id from another
/// project is reported as not found. The lookup runs before the status code is
/// read: a missing task is `NotFound` even when the status would have made the
/// move a no-op.
pub async fn move_task_in_project<S>(
    store: &S,
    project_id: i64,
    task_id: i64,
    new_status: Option<&str>,
) -> TrackerResult<Task>
where
    S: ProjectStore + ?Sized,
{
    let task = store
        .find_task(task_id)
        .await?
        .filter(|t| t.project_id == project_id)
        .ok_or_else(|| TrackerError::not_found("task"))?;

    move_task(store, &task, new_status).await
}

/// Display order: column, then position, then most recently updated
pub fn display_order(a: &Task, b: &Task) -> Ordering {
    a.status
        .cmp(&b.status)
        .then(a.order.cmp(&b.order))
        .then(b.updated_at.cmp(&a.updated_at))
}

/// One board column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardColumn {
    pub status: TaskStatus,
    pub label: &'static str,
    pub tasks: Vec<Task>,
}

/// Groups tasks into the four columns, each sorted for display
///
/// Every column is present, empty ones included.
pub fn build_board(mut tasks: Vec<Task>) -> Vec<BoardColumn> {
    tasks.sort_by(display_order);

    TaskStatus::COLUMNS
        .iter()
        .map(|&status| BoardColumn {
            status,
            label: status.label(),
            tasks: tasks.iter().filter(|t| t.status == status).cloned().collect(),
        })
        .collect()
}

/// Loads a project's tasks as board columns
pub async fn load_board<S>(store: &S, project_id: i64) -> TrackerResult<Vec<BoardColumn>>
where
    S: ProjectStore + ?Sized,
{
    let tasks = store.tasks_in_project(project_id).await?;
    Ok(build_board(tasks))
}
