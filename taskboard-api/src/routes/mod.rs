/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `projects`: Project CRUD, membership-scoped listing
/// - `members`: Collaborator listing and management
/// - `board`: Board columns and drag-and-drop moves
/// - `tasks`: Task CRUD, filtered listings and status moves

pub mod board;
pub mod health;
pub mod members;
pub mod projects;
pub mod tasks;

use crate::error::ApiResult;
use sqlx::PgPool;
use taskboard_shared::{
    auth::{
        authorization::{authorize, ProjectAction},
        middleware::AuthContext,
        resolver::{resolve_project, LoadedEntity, RouteParams},
    },
    error::TrackerError,
    models::project::Project,
};

/// Loads the project at `/projects/:pk` and gates `action` on it
///
/// # Errors
///
/// 404 when the project doesn't exist, 403 when the actor lacks the role
pub(crate) async fn project_for(
    db: &PgPool,
    auth: &AuthContext,
    pk: i64,
    action: ProjectAction,
) -> ApiResult<Project> {
    let loaded = Project::find_by_id(db, pk)
        .await?
        .ok_or_else(|| TrackerError::not_found("project"))?;

    let project = resolve_project(db, &RouteParams::pk(pk), Some(LoadedEntity::Project(&loaded))).await?;
    authorize(db, &project, Some(auth), action).await?;

    Ok(project)
}

/// Resolves the project behind a route without loading the entity first
pub(crate) async fn resolved_project(
    db: &PgPool,
    auth: &AuthContext,
    params: RouteParams,
    action: ProjectAction,
) -> ApiResult<Project> {
    let project = resolve_project(db, &params, None).await?;
    authorize(db, &project, Some(auth), action).await?;

    Ok(project)
}
