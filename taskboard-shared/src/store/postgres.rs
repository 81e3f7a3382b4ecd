/// PostgreSQL implementation of [`ProjectStore`]
///
/// Delegates to the model functions. The only logic of its own is the column
/// append, which runs in a transaction holding a row lock on the owning
/// project:
///
/// ```sql
/// SELECT p.id FROM projects p JOIN tasks t ON t.project_id = p.id
///  WHERE t.id = $1 FOR UPDATE OF p;
/// SELECT MAX("order") FROM tasks WHERE project_id = $1 AND status = $2;
/// UPDATE tasks SET status = $2, "order" = $3, updated_at = NOW() WHERE id = $1;
/// ```
///
/// Two concurrent moves into the same project serialize on the lock, so they
/// never compute the same position. A task edit that also changes the column
/// writes its fields inside the same transaction, so a failed append rolls
/// the edit back too.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::debug;

use super::{ProjectStore, StoreError, StoreResult};
use crate::board::next_order;
use crate::models::membership::{Membership, MembershipRole};
use crate::models::project::{Project, ProjectStatus};
use crate::models::task::{Task, TaskFilter, TaskStatus, UpdateTask};
use crate::models::user::User;

#[async_trait]
impl ProjectStore for PgPool {
    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>> {
        Ok(Project::find_by_id(self, id).await?)
    }

    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(self, id).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(self, username).await?)
    }

    async fn membership_role(&self, project_id: i64, user_id: i64) -> StoreResult<Option<MembershipRole>> {
        Ok(Membership::get_role(self, project_id, user_id).await?)
    }

    async fn upsert_membership(
        &self,
        project_id: i64,
        user_id: i64,
        role: MembershipRole,
    ) -> StoreResult<Membership> {
        Ok(Membership::upsert(self, project_id, user_id, role).await?)
    }

    async fn delete_membership(&self, project_id: i64, user_id: i64) -> StoreResult<bool> {
        Ok(Membership::delete(self, project_id, user_id).await?)
    }

    async fn append_to_column(&self, task_id: i64, status: TaskStatus) -> StoreResult<Option<Task>> {
        let mut tx = self.begin().await?;

        let Some(project_id) = lock_project_of(&mut *tx, task_id).await? else {
            return Ok(None);
        };

        let order = claim_position(&mut *tx, project_id, status).await?;
        let task = Task::set_position(&mut *tx, task_id, status, order).await?;
        tx.commit().await?;

        debug!(task_id, project_id, status = status.as_str(), order, "Task appended to column");
        Ok(task)
    }

    async fn update_task(
        &self,
        task_id: i64,
        data: UpdateTask,
        status: Option<TaskStatus>,
    ) -> StoreResult<Option<Task>> {
        let mut tx = self.begin().await?;

        let Some(project_id) = lock_project_of(&mut *tx, task_id).await? else {
            return Ok(None);
        };

        let Some(task) = Task::update(&mut *tx, task_id, &data).await? else {
            return Ok(None);
        };

        let task = match status {
            Some(status) if status != task.status => {
                let order = claim_position(&mut *tx, project_id, status).await?;
                debug!(task_id, project_id, status = status.as_str(), order, "Task appended to column");
                Task::set_position(&mut *tx, task_id, status, order).await?
            }
            _ => Some(task),
        };

        tx.commit().await?;
        Ok(task)
    }

    async fn projects_for_member(
        &self,
        user_id: i64,
        status: Option<ProjectStatus>,
    ) -> StoreResult<Vec<Project>> {
        Ok(Project::list_for_member(self, user_id, status).await?)
    }

    async fn tasks_in_project(&self, project_id: i64) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_project(self, project_id, &TaskFilter::default()).await?)
    }
}

/// Locks the project owning `task_id`, `None` when the task does not exist
async fn lock_project_of(conn: &mut PgConnection, task_id: i64) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT p.id
        FROM projects p
        JOIN tasks t ON t.project_id = p.id
        WHERE t.id = $1
        FOR UPDATE OF p
        "#,
    )
    .bind(task_id)
    .fetch_optional(conn)
    .await
}

/// Next free position in a column; the project row must already be locked
async fn claim_position(conn: &mut PgConnection, project_id: i64, status: TaskStatus) -> StoreResult<i32> {
    let max = Task::max_order_in_column(&mut *conn, project_id, status).await?;
    next_order(max).ok_or(StoreError::ColumnFull { project_id, status })
}
