/// Identity, access policy and project resolution
///
/// # Modules
///
/// - [`jwt`]: Validation of bearer tokens issued by the identity provider
/// - [`middleware`]: Axum middleware attaching the [`middleware::AuthContext`]
/// - [`authorization`]: `is_member` / `is_owner` and the `authorize` guard
/// - [`resolver`]: Maps route identifiers to the owning project
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::authorization::{authorize, ProjectAction};
/// use taskboard_shared::auth::middleware::AuthContext;
/// use taskboard_shared::auth::resolver::{resolve_project, RouteParams};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, auth: AuthContext, task_id: i64) -> Result<(), Box<dyn std::error::Error>> {
/// let project = resolve_project(&pool, &RouteParams::pk(task_id), None).await?;
/// authorize(&pool, &project, Some(&auth), ProjectAction::EditTask).await?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod resolver;
