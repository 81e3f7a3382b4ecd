/// Task model and database operations
///
/// Tasks belong to exactly one project and sit in one board column (their
/// status). Within a column they are sorted by `order`, which the board engine
/// assigns; nothing in this module lets a caller choose an `order` directly.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('TODO', 'IN_PROGRESS', 'BLOCKED', 'DONE');
///
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     title VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status task_status NOT NULL DEFAULT 'TODO',
///     priority SMALLINT NOT NULL DEFAULT 2 CHECK (priority BETWEEN 1 AND 3),
///     due_date DATE,
///     assignee_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     "order" INTEGER NOT NULL DEFAULT 0 CHECK ("order" >= 0),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// The enum is declared in board column order, so `ORDER BY status` yields
/// To Do, In Progress, Blocked, Done.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{CreateTask, Task, TaskFilter};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, project_id: i64) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     project_id,
///     title: "Draft landing page".to_string(),
///     ..Default::default()
/// }).await?;
/// assert_eq!(task.order, 0);
///
/// let tasks = Task::list_by_project(&pool, project_id, &TaskFilter::default()).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

/// Board column a task sits in
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Blocked,
    Done,
}

impl TaskStatus {
    /// All statuses in board column order
    pub const COLUMNS: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Blocked,
        TaskStatus::Done,
    ];

    /// Wire/database code
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Blocked => "BLOCKED",
            TaskStatus::Done => "DONE",
        }
    }

    /// Column heading
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Blocked => "Blocked",
            TaskStatus::Done => "Done",
        }
    }

    /// Parses a wire code, `None` for anything else (including `""`)
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "TODO" => Some(TaskStatus::Todo),
            "IN_PROGRESS" => Some(TaskStatus::InProgress),
            "BLOCKED" => Some(TaskStatus::Blocked),
            "DONE" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

/// Task priority, stored and sent as its integer code
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[repr(i16)]
#[serde(try_from = "i16", into = "i16")]
pub enum TaskPriority {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl TryFrom<i16> for TaskPriority {
    type Error = String;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(TaskPriority::Low),
            2 => Ok(TaskPriority::Medium),
            3 => Ok(TaskPriority::High),
            other => Err(format!("invalid priority {other}, expected 1, 2 or 3")),
        }
    }
}

impl From<TaskPriority> for i16 {
    fn from(priority: TaskPriority) -> Self {
        priority as i16
    }
}

/// Task record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: i64,

    /// Owning project
    pub project_id: i64,

    pub title: String,
    pub description: String,

    /// Board column
    pub status: TaskStatus,

    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<i64>,

    /// Position within (project, status); higher sorts later
    pub order: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTask {
    pub project_id: i64,
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

/// Input for replacing a task's descriptive fields
///
/// Status is not here: a column change always goes through the board engine
/// so the task receives a fresh position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<i64>,
}

/// Sort order for task listings
///
/// Listings default to board order. The other keys are the query codes
/// `due_date`, `updated_at` and `order`, each optionally prefixed with `-`
/// for descending. Ties fall back to the task id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskOrdering {
    /// Column, then position, then most recently updated
    #[default]
    Board,
    DueDate,
    DueDateDesc,
    UpdatedAt,
    UpdatedAtDesc,
    Order,
    OrderDesc,
}

impl TaskOrdering {
    /// Parses a query code, `None` for anything not listed above
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "due_date" => Some(TaskOrdering::DueDate),
            "-due_date" => Some(TaskOrdering::DueDateDesc),
            "updated_at" => Some(TaskOrdering::UpdatedAt),
            "-updated_at" => Some(TaskOrdering::UpdatedAtDesc),
            "order" => Some(TaskOrdering::Order),
            "-order" => Some(TaskOrdering::OrderDesc),
            _ => None,
        }
    }

    /// `ORDER BY` body for a query selecting from `tasks t`
    fn sql(&self) -> &'static str {
        match self {
            TaskOrdering::Board => r#"t.status ASC, t."order" ASC, t.updated_at DESC, t.id ASC"#,
            TaskOrdering::DueDate => "t.due_date ASC, t.id ASC",
            TaskOrdering::DueDateDesc => "t.due_date DESC, t.id ASC",
            TaskOrdering::UpdatedAt => "t.updated_at ASC, t.id ASC",
            TaskOrdering::UpdatedAtDesc => "t.updated_at DESC, t.id ASC",
            TaskOrdering::Order => r#"t."order" ASC, t.id ASC"#,
            TaskOrdering::OrderDesc => r#"t."order" DESC, t.id ASC"#,
        }
    }
}

/// Optional equality filters and sort order for task listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub project: Option<i64>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assignee: Option<i64>,
    pub ordering: TaskOrdering,
}

impl TaskFilter {
    /// Whether a task passes every set filter
    pub fn matches(&self, task: &Task) -> bool {
        self.project.map_or(true, |p| task.project_id == p)
            && self.status.map_or(true, |s| task.status == s)
            && self.priority.map_or(true, |p| task.priority == p)
            && self.assignee.map_or(true, |a| task.assignee_id == Some(a))
    }
}

impl Task {
    /// Creates a task at position 0 of its column
    ///
    /// # Errors
    ///
    /// Returns an error if the project or assignee doesn't exist, or the
    /// database fails
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (project_id, title, description, status, priority, due_date, assignee_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, project_id, title, description, status, priority, due_date,
                      assignee_id, "order", created_at, updated_at
            "#,
        )
        .bind(data.project_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(data.assignee_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, status, priority, due_date,
                   assignee_id, "order", created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID, scoped to one project
    pub async fn find_in_project(
        pool: &PgPool,
        project_id: i64,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, status, priority, due_date,
                   assignee_id, "order", created_at, updated_at
            FROM tasks
            WHERE id = $1 AND project_id = $2
            "#,
        )
        .bind(id)
        .bind(project_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a project's tasks, in board order unless `filter.ordering` says
    /// otherwise
    ///
    /// `filter.project` is ignored; the project is given explicitly.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: i64,
        filter: &TaskFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT t.id, t.project_id, t.title, t.description, t.status, t.priority,
                   t.due_date, t.assignee_id, t."order", t.created_at, t.updated_at
            FROM tasks t
            WHERE t.project_id = $1
              AND ($2::task_status IS NULL OR t.status = $2)
              AND ($3::smallint IS NULL OR t.priority = $3)
              AND ($4::bigint IS NULL OR t.assignee_id = $4)
            ORDER BY {}
            "#,
            filter.ordering.sql()
        );

        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(project_id)
            .bind(filter.status)
            .bind(filter.priority)
            .bind(filter.assignee)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Lists tasks across every project the user is a member of
    pub async fn list_for_member(
        pool: &PgPool,
        user_id: i64,
        filter: &TaskFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT t.id, t.project_id, t.title, t.description, t.status, t.priority,
                   t.due_date, t.assignee_id, t."order", t.created_at, t.updated_at
            FROM tasks t
            WHERE EXISTS (
                SELECT 1 FROM memberships m
                WHERE m.project_id = t.project_id AND m.user_id = $1
            )
              AND ($2::bigint IS NULL OR t.project_id = $2)
              AND ($3::task_status IS NULL OR t.status = $3)
              AND ($4::smallint IS NULL OR t.priority = $4)
              AND ($5::bigint IS NULL OR t.assignee_id = $5)
            ORDER BY {}
            "#,
            filter.ordering.sql()
        );

        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(user_id)
            .bind(filter.project)
            .bind(filter.status)
            .bind(filter.priority)
            .bind(filter.assignee)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Replaces a task's descriptive fields, leaving status and order alone
    ///
    /// Callers that may also change the column go through
    /// [`crate::board::update_task`] so both writes share a transaction.
    pub async fn update<'e, E>(executor: E, id: i64, data: &UpdateTask) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $2,
                description = $3,
                priority = $4,
                due_date = $5,
                assignee_id = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, title, description, status, priority, due_date,
                      assignee_id, "order", created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(data.assignee_id)
        .fetch_optional(executor)
        .await?;

        Ok(task)
    }

    /// Deletes a task
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Highest `order` in a column, `None` when the column is empty
    pub async fn max_order_in_column<'e, E>(
        executor: E,
        project_id: i64,
        status: TaskStatus,
    ) -> Result<Option<i32>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let max: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT MAX("order") FROM tasks
            WHERE project_id = $1 AND status = $2
            "#,
        )
        .bind(project_id)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(max)
    }

    /// Writes a new column and position, bumping `updated_at`
    ///
    /// Only called by the board engine with a position it computed.
    pub async fn set_position<'e, E>(
        executor: E,
        id: i64,
        status: TaskStatus,
        order: i32,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = $2,
                "order" = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, title, description, status, priority, due_date,
                      assignee_id, "order", created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(order)
        .fetch_optional(executor)
        .await?;

        Ok(task)
    }

    /// Counts tasks in a project
    pub async fn count_by_project(pool: &PgPool, project_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(status: TaskStatus, priority: TaskPriority, assignee_id: Option<i64>) -> Task {
        Task {
            id: 1,
            project_id: 10,
            title: "t".to_string(),
            description: String::new(),
            status,
            priority,
            due_date: None,
            assignee_id,
            order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_codes() {
        for status in TaskStatus::COLUMNS {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TaskStatus::parse(""), None);
        assert_eq!(TaskStatus::parse("INVALID"), None);
        assert_eq!(TaskStatus::parse("todo"), None);
    }

    #[test]
    fn test_status_column_order() {
        assert!(TaskStatus::Todo < TaskStatus::InProgress);
        assert!(TaskStatus::InProgress < TaskStatus::Blocked);
        assert!(TaskStatus::Blocked < TaskStatus::Done);
        assert_eq!(TaskStatus::InProgress.label(), "In Progress");
        assert_eq!(TaskStatus::Todo.label(), "To Do");
    }

    #[test]
    fn test_priority_integer_codes() {
        assert_eq!(i16::from(TaskPriority::Low), 1);
        assert_eq!(i16::from(TaskPriority::High), 3);
        assert_eq!(TaskPriority::try_from(2), Ok(TaskPriority::Medium));
        assert!(TaskPriority::try_from(0).is_err());
        assert!(TaskPriority::try_from(4).is_err());
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn test_priority_serde() {
        assert_eq!(serde_json::to_string(&TaskPriority::High).unwrap(), "3");
        let p: TaskPriority = serde_json::from_str("1").unwrap();
        assert_eq!(p, TaskPriority::Low);
        assert!(serde_json::from_str::<TaskPriority>("9").is_err());
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
    }

    #[test]
    fn test_ordering_codes() {
        assert_eq!(TaskOrdering::parse("due_date"), Some(TaskOrdering::DueDate));
        assert_eq!(TaskOrdering::parse("-updated_at"), Some(TaskOrdering::UpdatedAtDesc));
        assert_eq!(TaskOrdering::parse("-order"), Some(TaskOrdering::OrderDesc));
        assert_eq!(TaskOrdering::parse("title"), None);
        assert_eq!(TaskOrdering::parse("order; DROP TABLE tasks"), None);
        assert_eq!(TaskOrdering::default(), TaskOrdering::Board);
    }

    #[test]
    fn test_ordering_sql_is_tie_broken() {
        for ordering in [
            TaskOrdering::Board,
            TaskOrdering::DueDate,
            TaskOrdering::DueDateDesc,
            TaskOrdering::UpdatedAt,
            TaskOrdering::UpdatedAtDesc,
            TaskOrdering::Order,
            TaskOrdering::OrderDesc,
        ] {
            assert!(ordering.sql().ends_with("t.id ASC"));
        }
        assert!(TaskOrdering::Board.sql().starts_with("t.status ASC"));
    }

    #[test]
    fn test_filter_matches() {
        let t = task(TaskStatus::Done, TaskPriority::High, Some(3));

        assert!(TaskFilter::default().matches(&t));
        assert!(TaskFilter { status: Some(TaskStatus::Done), ..Default::default() }.matches(&t));
        assert!(!TaskFilter { status: Some(TaskStatus::Todo), ..Default::default() }.matches(&t));
        assert!(TaskFilter { assignee: Some(3), ..Default::default() }.matches(&t));
        assert!(!TaskFilter { assignee: Some(4), ..Default::default() }.matches(&t));
        assert!(!TaskFilter { project: Some(11), ..Default::default() }.matches(&t));
        assert!(!TaskFilter { priority: Some(TaskPriority::Low), ..Default::default() }.matches(&t));
    }
}
