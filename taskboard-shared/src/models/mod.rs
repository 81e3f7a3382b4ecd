/// Database models for Taskboard
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: Accounts provisioned by the identity provider
/// - `project`: Projects, owned by one user
/// - `membership`: User-project relationships with roles
/// - `task`: Tasks on a project's board
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::project::{CreateProject, Project};
/// use taskboard_shared::models::task::{CreateTask, Task};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let project = Project::create(&pool, CreateProject {
///     owner_id: 1,
///     name: "Launch".to_string(),
///     ..Default::default()
/// }).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     project_id: project.id,
///     title: "Write announcement".to_string(),
///     ..Default::default()
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod membership;
pub mod project;
pub mod task;
pub mod user;
