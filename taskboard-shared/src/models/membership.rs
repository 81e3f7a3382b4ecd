/// Membership model and database operations
///
/// A membership grants one user a role on one project. At most one row exists
/// per (project, user); re-adding a collaborator updates the role in place.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE membership_role AS ENUM ('OWNER', 'MEMBER');
///
/// CREATE TABLE memberships (
///     id BIGSERIAL PRIMARY KEY,
///     project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role membership_role NOT NULL DEFAULT 'MEMBER',
///     added_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT unique_membership_per_project UNIQUE (project_id, user_id)
/// );
/// ```
///
/// # Roles
///
/// - **OWNER**: edit and delete the project, manage collaborators, plus everything a member can do
/// - **MEMBER**: view the project, create, edit, move and delete its tasks
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::membership::{Membership, MembershipRole};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, project_id: i64, user_id: i64) -> Result<(), sqlx::Error> {
/// Membership::upsert(&pool, project_id, user_id, MembershipRole::Member).await?;
/// let role = Membership::get_role(&pool, project_id, user_id).await?;
/// assert_eq!(role, Some(MembershipRole::Member));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

/// Role a user holds on a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "membership_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipRole {
    /// Full control over the project and its collaborators
    Owner,

    /// Works with the project's tasks
    Member,
}

impl MembershipRole {
    /// Wire/database code
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::Owner => "OWNER",
            MembershipRole::Member => "MEMBER",
        }
    }

    /// Whether this role grants at least the `required` role
    ///
    /// Owner > Member
    pub fn satisfies(&self, required: MembershipRole) -> bool {
        match required {
            MembershipRole::Owner => *self == MembershipRole::Owner,
            MembershipRole::Member => true,
        }
    }
}

impl Default for MembershipRole {
    fn default() -> Self {
        MembershipRole::Member
    }
}

/// Membership row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Membership ID
    pub id: i64,

    /// Project the role applies to
    pub project_id: i64,

    /// User holding the role
    pub user_id: i64,

    /// Role within the project
    pub role: MembershipRole,

    /// When the membership was created
    pub added_at: DateTime<Utc>,
}

/// Membership joined with the member's username, for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemberDetail {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub username: String,
    pub role: MembershipRole,
    pub added_at: DateTime<Utc>,
}

impl Membership {
    /// Inserts a membership
    ///
    /// Generic over the executor so project creation can add the owner's
    /// membership inside its own transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The (project, user) pair already exists (unique constraint violation)
    /// - Project or user doesn't exist (foreign key violation)
    /// - Database connection fails
    pub async fn create<'e, E>(
        executor: E,
        project_id: i64,
        user_id: i64,
        role: MembershipRole,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (project_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING id, project_id, user_id, role, added_at
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(executor)
        .await?;

        Ok(membership)
    }

    /// Inserts a membership or updates the role of the existing one
    ///
    /// Keyed on (project, user): a second call never creates a duplicate row,
    /// and `added_at` of an existing row is preserved.
    pub async fn upsert(
        pool: &PgPool,
        project_id: i64,
        user_id: i64,
        role: MembershipRole,
    ) -> Result<Self, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (project_id, user_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (project_id, user_id)
            DO UPDATE SET role = EXCLUDED.role
            RETURNING id, project_id, user_id, role, added_at
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(pool)
        .await?;

        Ok(membership)
    }

    /// Gets a user's role in a project, `None` when not a member
    pub async fn get_role(
        pool: &PgPool,
        project_id: i64,
        user_id: i64,
    ) -> Result<Option<MembershipRole>, sqlx::Error> {
        let role: Option<MembershipRole> = sqlx::query_scalar(
            r#"
            SELECT role FROM memberships
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(role)
    }

    /// Deletes a membership
    ///
    /// Returns `true` if a row was removed. This is the raw store operation;
    /// request handlers go through [`crate::collaborators::remove_membership`],
    /// which refuses to remove the project owner.
    pub async fn delete(pool: &PgPool, project_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM memberships WHERE project_id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the members of a project with their usernames
    pub async fn list_members(pool: &PgPool, project_id: i64) -> Result<Vec<MemberDetail>, sqlx::Error> {
        let members = sqlx::query_as::<_, MemberDetail>(
            r#"
            SELECT m.id, m.project_id, m.user_id, u.username, m.role, m.added_at
            FROM memberships m
            JOIN users u ON u.id = m.user_id
            WHERE m.project_id = $1
            ORDER BY m.added_at ASC, m.id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Counts members in a project
    pub async fn count_by_project(pool: &PgPool, project_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM memberships WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_role_codes() {
        assert_eq!(MembershipRole::Owner.as_str(), "OWNER");
        assert_eq!(MembershipRole::Member.as_str(), "MEMBER");
        assert!(serde_json::from_str::<MembershipRole>("\"owner\"").is_err());
        assert_eq!(MembershipRole::default(), MembershipRole::Member);
    }

    #[test]
    fn test_role_satisfies() {
        assert!(MembershipRole::Owner.satisfies(MembershipRole::Owner));
        assert!(MembershipRole::Owner.satisfies(MembershipRole::Member));
        assert!(MembershipRole::Member.satisfies(MembershipRole::Member));
        assert!(!MembershipRole::Member.satisfies(MembershipRole::Owner));
    }

    #[test]
    fn test_role_serializes_as_wire_code() {
        let json = serde_json::to_string(&MembershipRole::Owner).unwrap();
        assert_eq!(json, "\"OWNER\"");

        let role: MembershipRole = serde_json::from_str("\"MEMBER\"").unwrap();
        assert_eq!(role, MembershipRole::Member);
    }

    #[test]
    fn test_default_role_is_member() {
        assert_eq!(MembershipRole::default(), MembershipRole::Member);
    }
}
