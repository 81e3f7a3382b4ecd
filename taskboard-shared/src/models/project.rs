/// Project model and database operations
///
/// A project is owned by one user and shared with collaborators through
/// memberships. Creating a project also creates the owner's OWNER membership in
/// the same transaction, so a project is never visible without an owner.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_status AS ENUM (
///     'PLANNED', 'IN_PROGRESS', 'ON_HOLD', 'COMPLETED', 'CANCELLED'
/// );
///
/// CREATE TABLE projects (
///     id BIGSERIAL PRIMARY KEY,
///     owner_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status project_status NOT NULL DEFAULT 'PLANNED',
///     start_date DATE,
///     end_date DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT unique_project_name_per_owner UNIQUE (owner_id, name)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::project::{CreateProject, Project};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, owner_id: i64) -> Result<(), Box<dyn std::error::Error>> {
/// let project = Project::create(&pool, CreateProject {
///     owner_id,
///     name: "Website relaunch".to_string(),
///     ..Default::default()
/// }).await?;
///
/// let mine = Project::list_for_member(&pool, owner_id, None).await?;
/// assert!(mine.iter().any(|p| p.id == project.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

use crate::error::{TrackerError, TrackerResult};
use crate::models::membership::{Membership, MembershipRole};

/// Message attached to `end_date` when the schedule is inverted
pub const DATE_ORDER_MESSAGE: &str = "End date cannot be before start date.";

/// Lifecycle status of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Planned,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    /// Wire/database code
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planned => "PLANNED",
            ProjectStatus::InProgress => "IN_PROGRESS",
            ProjectStatus::OnHold => "ON_HOLD",
            ProjectStatus::Completed => "COMPLETED",
            ProjectStatus::Cancelled => "CANCELLED",
        }
    }

    /// Parses a wire code, `None` for anything else
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "PLANNED" => Some(ProjectStatus::Planned),
            "IN_PROGRESS" => Some(ProjectStatus::InProgress),
            "ON_HOLD" => Some(ProjectStatus::OnHold),
            "COMPLETED" => Some(ProjectStatus::Completed),
            "CANCELLED" => Some(ProjectStatus::Cancelled),
            _ => None,
        }
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Planned
    }
}

/// Project record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Project ID
    pub id: i64,

    /// Owning user; always holds an OWNER membership
    pub owner_id: i64,

    /// Name, unique per owner
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Lifecycle status
    pub status: ProjectStatus,

    /// Planned start
    pub start_date: Option<NaiveDate>,

    /// Planned end, never before `start_date`
    pub end_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProject {
    /// The acting user, who becomes the owner
    pub owner_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Input for replacing a project's editable fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Whether a schedule is well-formed (open ends are always fine)
pub fn dates_in_order(start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    match (start, end) {
        (Some(start), Some(end)) => end >= start,
        _ => true,
    }
}

/// Rejects an inverted schedule with a field error on `end_date`
pub fn validate_schedule(start: Option<NaiveDate>, end: Option<NaiveDate>) -> TrackerResult<()> {
    if dates_in_order(start, end) {
        Ok(())
    } else {
        Err(TrackerError::validation("end_date", DATE_ORDER_MESSAGE))
    }
}

impl Project {
    /// Creates a project and its owner's OWNER membership atomically
    ///
    /// # Errors
    ///
    /// - `TrackerError::Validation` if `end_date` precedes `start_date`
    /// - `TrackerError::Store` on database failure, including a duplicate
    ///   (owner, name) pair
    pub async fn create(pool: &PgPool, data: CreateProject) -> TrackerResult<Self> {
        validate_schedule(data.start_date, data.end_date)?;

        let mut tx = pool.begin().await?;

        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (owner_id, name, description, status, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, owner_id, name, description, status, start_date, end_date,
                      created_at, updated_at
            "#,
        )
        .bind(data.owner_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.status)
        .bind(data.start_date)
        .bind(data.end_date)
        .fetch_one(&mut *tx)
        .await?;

        Membership::create(&mut *tx, project.id, data.owner_id, MembershipRole::Owner).await?;

        tx.commit().await?;

        info!(project_id = project.id, owner_id = project.owner_id, "Project created");
        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, owner_id, name, description, status, start_date, end_date,
                   created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists the projects a user is a member of, most recently updated first
    pub async fn list_for_member(
        pool: &PgPool,
        user_id: i64,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.owner_id, p.name, p.description, p.status, p.start_date,
                   p.end_date, p.created_at, p.updated_at
            FROM projects p
            WHERE EXISTS (
                SELECT 1 FROM memberships m
                WHERE m.project_id = p.id AND m.user_id = $1
            )
            AND ($2::project_status IS NULL OR p.status = $2)
            ORDER BY p.updated_at DESC, p.id DESC
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Replaces a project's editable fields
    ///
    /// Returns `None` when the project does not exist.
    pub async fn update(pool: &PgPool, id: i64, data: UpdateProject) -> TrackerResult<Option<Self>> {
        validate_schedule(data.start_date, data.end_date)?;

        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = $2,
                description = $3,
                status = $4,
                start_date = $5,
                end_date = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, name, description, status, start_date, end_date,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.status)
        .bind(data.start_date)
        .bind(data.end_date)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Deletes a project
    ///
    /// Tasks and memberships are removed by `ON DELETE CASCADE`.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
