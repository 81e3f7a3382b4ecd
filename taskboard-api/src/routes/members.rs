/// Collaborator endpoints
///
/// # Endpoints
///
/// - `GET /v1/projects/:pk/members` - List members with usernames (member)
/// - `POST /v1/projects/:pk/members` - Add a user by username or change their role (owner)
/// - `POST /v1/projects/:pk/members/remove` - Remove a user (owner)
///
/// Removing the project's owner answers 200 with
/// `{"status": "refused", "message": "..."}` and changes nothing.

use crate::{app::AppState, error::ApiResult, routes::project_for};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use taskboard_shared::{
    auth::{authorization::ProjectAction, middleware::AuthContext},
    collaborators::{add_or_update_membership, remove_membership, RemovalOutcome},
    models::membership::{MemberDetail, Membership, MembershipRole},
};
use validator::Validate;

/// Add or update a collaborator
#[derive(Debug, Deserialize, Validate)]
pub struct AddMemberRequest {
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: String,

    /// `OWNER` or `MEMBER` (default)
    #[serde(default)]
    pub role: MembershipRole,
}

/// Remove a collaborator
#[derive(Debug, Deserialize)]
pub struct RemoveMemberRequest {
    pub user_id: i64,
}

/// Lists a project's members
pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(pk): Path<i64>,
) -> ApiResult<Json<Vec<MemberDetail>>> {
    let project = project_for(&state.db, &auth, pk, ProjectAction::ViewMembers).await?;
    let members = Membership::list_members(&state.db, project.id).await?;

    Ok(Json(members))
}

/// Adds a collaborator or updates their role
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(pk): Path<i64>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<Json<Membership>> {
    let project = project_for(&state.db, &auth, pk, ProjectAction::ManageMembers).await?;
    req.validate()?;

    let membership = add_or_update_membership(&state.db, &project, &auth, &req.username, req.role).await?;

    Ok(Json(membership))
}

/// Removes a collaborator
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(pk): Path<i64>,
    Json(req): Json<RemoveMemberRequest>,
) -> ApiResult<Json<RemovalOutcome>> {
    let project = project_for(&state.db, &auth, pk, ProjectAction::ManageMembers).await?;
    let outcome = remove_membership(&state.db, &project, req.user_id).await?;

    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_member_role_defaults_to_member() {
        let req: AddMemberRequest = serde_json::from_value(serde_json::json!({ "username": "bob" })).unwrap();
        assert_eq!(req.role, MembershipRole::Member);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_add_member_rejects_unknown_role() {
        let result = serde_json::from_value::<AddMemberRequest>(serde_json::json!({
            "username": "bob",
            "role": "ADMIN"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_add_member_requires_username() {
        let req: AddMemberRequest = serde_json::from_value(serde_json::json!({
            "username": "",
            "role": "OWNER"
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }
}
