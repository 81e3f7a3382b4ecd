/// Entity store seam used by the access-control and ordering core
///
/// The resolver, the access policy, collaborator management and the board
/// engine only talk to a [`ProjectStore`]. Production wires in the
/// PostgreSQL pool (`impl ProjectStore for PgPool`); tests use
/// [`memory::MemoryStore`].
///
/// Plain CRUD that involves no access rule (creating a task, editing a
/// project's description) stays on the models and is called by the API
/// handlers directly.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::membership::{Membership, MembershipRole};
use crate::models::project::{Project, ProjectStatus};
use crate::models::task::{Task, TaskStatus, UpdateTask};
use crate::models::user::User;

pub mod memory;
pub mod postgres;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    /// PostgreSQL failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A write referenced a row that does not exist
    #[error("integrity error: {0}")]
    Integrity(String),

    /// The target column already holds the highest representable position
    #[error("column {} of project {project_id} has no free position", .status.as_str())]
    ColumnFull { project_id: i64, status: TaskStatus },
}

/// Persistence contract for the core
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Finds a project by ID
    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>>;

    /// Finds a task by ID
    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>>;

    /// Finds a user by exact username
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Role of a user in a project, `None` when not a member
    async fn membership_role(&self, project_id: i64, user_id: i64) -> StoreResult<Option<MembershipRole>>;

    /// Creates the membership or replaces its role
    async fn upsert_membership(
        &self,
        project_id: i64,
        user_id: i64,
        role: MembershipRole,
    ) -> StoreResult<Membership>;

    /// Deletes a membership; `false` when there was none
    async fn delete_membership(&self, project_id: i64, user_id: i64) -> StoreResult<bool>;

    /// Moves a task to the end of a column of its project
    ///
    /// Reading the column maximum and writing the new position happen as one
    /// atomic step with respect to other moves in the same project. Returns
    /// `None` when the task does not exist.
    async fn append_to_column(&self, task_id: i64, status: TaskStatus) -> StoreResult<Option<Task>>;

    /// Replaces a task's descriptive fields and, when `status` differs from
    /// the stored one, appends it to that column
    ///
    /// Both writes commit together or not at all, under the same exclusion
    /// as [`ProjectStore::append_to_column`]. Returns `None` when the task
    /// does not exist.
    async fn update_task(
        &self,
        task_id: i64,
        data: UpdateTask,
        status: Option<TaskStatus>,
    ) -> StoreResult<Option<Task>>;

    /// Projects the user is a member of, most recently updated first
    async fn projects_for_member(
        &self,
        user_id: i64,
        status: Option<ProjectStatus>,
    ) -> StoreResult<Vec<Project>>;

    /// Every task of a project
    async fn tasks_in_project(&self, project_id: i64) -> StoreResult<Vec<Task>>;
}
