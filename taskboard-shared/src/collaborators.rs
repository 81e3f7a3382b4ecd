/// Collaborator management
///
/// Owners invite users by username and remove them by id. Two rules sit on
/// top of the plain membership upsert/delete:
///
/// - An owner adding themselves always ends up OWNER, whatever role the form
///   asked for, so an owner cannot lock themselves out by accident.
/// - The project's owner (`projects.owner_id`) can never be removed. The
///   attempt is reported as [`RemovalOutcome::Refused`], not as an error.
///
/// Both functions assume the caller already passed
/// [`authorize`](crate::auth::authorization::authorize) with
/// `ProjectAction::ManageMembers`.

use serde::Serialize;
use tracing::{info, warn};

use crate::auth::middleware::AuthContext;
use crate::error::{TrackerError, TrackerResult};
use crate::models::membership::{Membership, MembershipRole};
use crate::models::project::Project;
use crate::store::ProjectStore;

/// Field error for an unknown username
pub const NO_SUCH_USER: &str = "No such user.";

/// Message shown when the owner's removal is refused
pub const OWNER_REMOVAL_REFUSED: &str = "Cannot remove the owner from the project.";

/// Result of a removal request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RemovalOutcome {
    /// The membership is gone (or never existed)
    Removed,

    /// Nothing changed
    Refused { message: String },
}

/// Adds a collaborator or changes their role
///
/// # Errors
///
/// `TrackerError::Validation` on `username` with "No such user." when the
/// username is unknown; nothing is written in that case.
pub async fn add_or_update_membership<S>(
    store: &S,
    project: &Project,
    actor: &AuthContext,
    username: &str,
    role: MembershipRole,
) -> TrackerResult<Membership>
where
    S: ProjectStore + ?Sized,
{
    let user = store
        .find_user_by_username(username.trim())
        .await?
        .ok_or_else(|| TrackerError::validation("username", NO_SUCH_USER))?;

    let role = if user.id == actor.user_id && role != MembershipRole::Owner {
        info!(
            project_id = project.id,
            user_id = user.id,
            requested = role.as_str(),
            "Self-assignment upgraded to OWNER"
        );
        MembershipRole::Owner
    } else {
        role
    };

    let membership = store.upsert_membership(project.id, user.id, role).await?;

    info!(
        project_id = project.id,
        user_id = user.id,
        role = membership.role.as_str(),
        actor_id = actor.user_id,
        "Membership saved"
    );
    Ok(membership)
}

/// Removes a collaborator
///
/// Removing a user without a membership is not an error.
pub async fn remove_membership<S>(
    store: &S,
    project: &Project,
    user_id: i64,
) -> TrackerResult<RemovalOutcome>
where
    S: ProjectStore + ?Sized,
{
    if user_id == project.owner_id {
        warn!(project_id = project.id, user_id, "Refused to remove project owner");
        return Ok(RemovalOutcome::Refused {
            message: OWNER_REMOVAL_REFUSED.to_string(),
        });
    }

    let existed = store.delete_membership(project.id, user_id).await?;
    info!(project_id = project.id, user_id, existed, "Membership removed");

    Ok(RemovalOutcome::Removed)
}
