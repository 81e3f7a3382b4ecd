/// Project endpoints
///
/// # Endpoints
///
/// - `GET /v1/projects` - Projects the caller is a member of (`?status=IN_PROGRESS`)
/// - `POST /v1/projects` - Create a project; the caller becomes its owner
/// - `GET /v1/projects/:pk` - Project with owner, members and task count (member)
/// - `PUT /v1/projects/:pk` - Replace editable fields (owner)
/// - `DELETE /v1/projects/:pk` - Delete with all tasks and memberships (owner)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::project_for,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{authorization::ProjectAction, middleware::AuthContext},
    models::{
        membership::{MemberDetail, Membership},
        project::{validate_schedule, CreateProject, Project, ProjectStatus, UpdateProject},
        task::Task,
        user::{User, UserSummary},
    },
    store::ProjectStore,
};
use tracing::info;
use validator::Validate;

/// Project list filters
#[derive(Debug, Default, Deserialize)]
pub struct ProjectListQuery {
    /// Status code, e.g. `ON_HOLD`
    pub status: Option<String>,
}

/// Create or replace a project
#[derive(Debug, Deserialize, Validate)]
pub struct ProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status: ProjectStatus,

    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ProjectRequest {
    /// Field checks plus the start/end ordering
    fn check(&self) -> ApiResult<()> {
        self.validate()?;
        validate_schedule(self.start_date, self.end_date)?;
        Ok(())
    }
}

/// Project with its owner, collaborators and task count
#[derive(Debug, Serialize)]
pub struct ProjectDetailResponse {
    #[serde(flatten)]
    pub project: Project,

    pub owner: Option<UserSummary>,
    pub members: Vec<MemberDetail>,
    pub task_count: i64,
}

/// Parses an optional status filter
///
/// An empty value means no filter.
pub(crate) fn parse_project_status(code: Option<&str>) -> ApiResult<Option<ProjectStatus>> {
    match code.map(str::trim).filter(|c| !c.is_empty()) {
        None => Ok(None),
        Some(code) => ProjectStatus::parse(code)
            .map(Some)
            .ok_or_else(|| ApiError::invalid_field("status", format!("Unknown project status '{}'", code))),
    }
}

/// Lists projects where the caller holds a membership
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ProjectListQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    let status = parse_project_status(query.status.as_deref())?;
    let projects = state.db.projects_for_member(auth.user_id, status).await?;

    Ok(Json(projects))
}

/// Creates a project owned by the caller
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    req.check()?;

    let project = Project::create(
        &state.db,
        CreateProject {
            owner_id: auth.user_id,
            name: req.name.trim().to_string(),
            description: req.description,
            status: req.status,
            start_date: req.start_date,
            end_date: req.end_date,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// Returns a project and its members
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(pk): Path<i64>,
) -> ApiResult<Json<ProjectDetailResponse>> {
    let project = project_for(&state.db, &auth, pk, ProjectAction::View).await?;
    let owner = User::find_by_id(&state.db, project.owner_id).await?;
    let members = Membership::list_members(&state.db, project.id).await?;
    let task_count = Task::count_by_project(&state.db, project.id).await?;

    Ok(Json(ProjectDetailResponse {
        owner: owner.as_ref().map(UserSummary::from),
        project,
        members,
        task_count,
    }))
}

/// Replaces a project's editable fields
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(pk): Path<i64>,
    Json(req): Json<ProjectRequest>,
) -> ApiResult<Json<Project>> {
    let project = project_for(&state.db, &auth, pk, ProjectAction::Update).await?;
    req.check()?;

    let updated = Project::update(
        &state.db,
        project.id,
        UpdateProject {
            name: req.name.trim().to_string(),
            description: req.description,
            status: req.status,
            start_date: req.start_date,
            end_date: req.end_date,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("project not found".to_string()))?;

    info!(project_id = updated.id, user_id = auth.user_id, "Project updated");
    Ok(Json(updated))
}

/// Deletes a project
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(pk): Path<i64>,
) -> ApiResult<StatusCode> {
    let project = project_for(&state.db, &auth, pk, ProjectAction::Delete).await?;

    if !Project::delete(&state.db, project.id).await? {
        return Err(ApiError::NotFound("project not found".to_string()));
    }

    info!(project_id = project.id, user_id = auth.user_id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}
