/// User model and database operations
///
/// Users are provisioned by the external identity provider. The tracker only
/// needs a stable numeric id (the token subject) and the username that
/// owners type when inviting collaborators.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     username VARCHAR(150) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::User;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// if let Some(user) = User::find_by_username(&pool, "alice").await? {
///     println!("alice is user {}", user.id);
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// User account as known to the tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// User ID (token subject)
    pub id: i64,

    /// Unique login name
    pub username: String,

    /// When the user was provisioned
    pub created_at: DateTime<Utc>,
}

/// Public projection of a user embedded in other responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

impl User {
    /// Provisions a user
    ///
    /// Used by identity-provider sync jobs and tests; the tracker itself never
    /// creates accounts during normal request handling.
    ///
    /// # Errors
    ///
    /// Returns an error if the username is taken or the database fails
    pub async fn create(pool: &PgPool, username: &str) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username)
            VALUES ($1)
            RETURNING id, username, created_at
            "#,
        )
        .bind(username)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by exact username
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use taskboard_shared::models::user::User;
    /// # use sqlx::PgPool;
    /// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
    /// let user = User::find_by_username(&pool, "bob").await?;
    /// assert!(user.is_some());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Deletes a user
    ///
    /// Memberships and owned projects cascade; tasks assigned to the user
    /// keep existing with their assignee cleared.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_summary_from_user() {
        let user = User {
            id: 7,
            username: "alice".to_string(),
            created_at: Utc::now(),
        };

        let summary = UserSummary::from(&user);
        assert_eq!(summary.id, 7);
        assert_eq!(summary.username, "alice");
    }
}
