/// Access policy for projects and their tasks
///
/// # Permission Model
///
/// Access is decided per project by the actor's membership:
///
/// | Action                                   | Required role |
/// |------------------------------------------|---------------|
/// | view project, members, board, tasks      | MEMBER        |
/// | create, edit, move, delete tasks         | MEMBER        |
/// | update or delete the project             | OWNER         |
/// | add, update or remove collaborators      | OWNER         |
///
/// An OWNER satisfies every MEMBER requirement. There is no ambient request
/// state: every check receives the actor explicitly.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::authorization::{authorize, ProjectAction};
/// use taskboard_shared::auth::middleware::AuthContext;
/// use taskboard_shared::error::TrackerResult;
/// use taskboard_shared::models::project::Project;
/// use sqlx::PgPool;
///
/// async fn rename(pool: &PgPool, project: &Project, auth: &AuthContext) -> TrackerResult<()> {
///     authorize(pool, project, Some(auth), ProjectAction::Update).await?;
///     // ... perform the update
///     Ok(())
/// }
/// ```

use tracing::{debug, warn};

use super::middleware::AuthContext;
use crate::error::{TrackerError, TrackerResult};
use crate::models::membership::MembershipRole;
use crate::models::project::Project;
use crate::store::{ProjectStore, StoreResult};

/// Operations gated by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectAction {
    View,
    Update,
    Delete,
    ViewMembers,
    ManageMembers,
    ViewTasks,
    CreateTask,
    EditTask,
    DeleteTask,
    MoveTask,
}

impl ProjectAction {
    /// Minimum role for this action
    pub fn required_role(&self) -> MembershipRole {
        match self {
            ProjectAction::Update | ProjectAction::Delete | ProjectAction::ManageMembers => {
                MembershipRole::Owner
            }
            ProjectAction::View
            | ProjectAction::ViewMembers
            | ProjectAction::ViewTasks
            | ProjectAction::CreateTask
            | ProjectAction::EditTask
            | ProjectAction::DeleteTask
            | ProjectAction::MoveTask => MembershipRole::Member,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectAction::View => "view project",
            ProjectAction::Update => "update project",
            ProjectAction::Delete => "delete project",
            ProjectAction::ViewMembers => "view members",
            ProjectAction::ManageMembers => "manage members",
            ProjectAction::ViewTasks => "view tasks",
            ProjectAction::CreateTask => "create task",
            ProjectAction::EditTask => "edit task",
            ProjectAction::DeleteTask => "delete task",
            ProjectAction::MoveTask => "move task",
        }
    }
}

/// Whether the user holds any membership in the project
pub async fn is_member<S>(store: &S, project: &Project, user_id: i64) -> StoreResult<bool>
where
    S: ProjectStore + ?Sized,
{
    Ok(store.membership_role(project.id, user_id).await?.is_some())
}

/// Whether the user holds an OWNER membership in the project
///
/// Note this checks the membership role, not `project.owner_id`: a
/// collaborator promoted to OWNER passes.
pub async fn is_owner<S>(store: &S, project: &Project, user_id: i64) -> StoreResult<bool>
where
    S: ProjectStore + ?Sized,
{
    Ok(store.membership_role(project.id, user_id).await? == Some(MembershipRole::Owner))
}

/// Gates `action` on `project` for `actor`
///
/// Returns the actor's role on success.
///
/// # Errors
///
/// - `TrackerError::Unauthorized` when there is no actor; no lookup happens
/// - `TrackerError::Forbidden` when the actor is not a member, or is a
///   member but the action needs OWNER
pub async fn authorize<S>(
    store: &S,
    project: &Project,
    actor: Option<&AuthContext>,
    action: ProjectAction,
) -> TrackerResult<MembershipRole>
where
    S: ProjectStore + ?Sized,
{
    let actor = actor.ok_or(TrackerError::Unauthorized)?;
    let required = action.required_role();

    match store.membership_role(project.id, actor.user_id).await? {
        Some(role) if role.satisfies(required) => {
            debug!(
                project_id = project.id,
                user_id = actor.user_id,
                action = action.as_str(),
                "Access granted"
            );
            Ok(role)
        }
        held => {
            warn!(
                project_id = project.id,
                user_id = actor.user_id,
                action = action.as_str(),
                role = ?held,
                "Access denied"
            );
            let reason = match held {
                None => "not a member of this project",
                Some(_) => "only project owners can do this",
            };
            Err(TrackerError::Forbidden(reason.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    #[test]
    fn test_required_roles() {
        assert_eq!(ProjectAction::Update.required_role(), MembershipRole::Owner);
        assert_eq!(ProjectAction::Delete.required_role(), MembershipRole::Owner);
        assert_eq!(ProjectAction::ManageMembers.required_role(), MembershipRole::Owner);
        assert_eq!(ProjectAction::View.required_role(), MembershipRole::Member);
        assert_eq!(ProjectAction::MoveTask.required_role(), MembershipRole::Member);
        assert_eq!(ProjectAction::DeleteTask.required_role(), MembershipRole::Member);
    }

    #[tokio::test]
    async fn test_membership_predicates() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice").await;
        let bob = store.add_user("bob").await;
        let carol = store.add_user("carol").await;
        let project = store.add_project(alice.id, "Proj").await;
        store.upsert_membership(project.id, bob.id, MembershipRole::Member).await.unwrap();

        assert!(is_member(&store, &project, alice.id).await.unwrap());
        assert!(is_owner(&store, &project, alice.id).await.unwrap());

        assert!(is_member(&store, &project, bob.id).await.unwrap());
        assert!(!is_owner(&store, &project, bob.id).await.unwrap());

        assert!(!is_member(&store, &project, carol.id).await.unwrap());
        assert!(!is_owner(&store, &project, carol.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_promoted_collaborator_is_owner() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice").await;
        let bob = store.add_user("bob").await;
        let project = store.add_project(alice.id, "Proj").await;
        store.upsert_membership(project.id, bob.id, MembershipRole::Owner).await.unwrap();

        assert!(is_owner(&store, &project, bob.id).await.unwrap());
        let role = authorize(&store, &project, Some(&AuthContext::new(bob.id)), ProjectAction::Delete)
            .await
            .unwrap();
        assert_eq!(role, MembershipRole::Owner);
    }

    #[tokio::test]
    async fn test_authorize_without_actor() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice").await;
        let project = store.add_project(alice.id, "Proj").await;

        let err = authorize(&store, &project, None, ProjectAction::View).await.unwrap_err();
        assert!(matches!(err, TrackerError::Unauthorized));
    }

    #[tokio::test]
    async fn test_member_cannot_update_project() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice").await;
        let bob = store.add_user("bob").await;
        let project = store.add_project(alice.id, "Proj").await;
        store.upsert_membership(project.id, bob.id, MembershipRole::Member).await.unwrap();

        let bob_ctx = AuthContext::new(bob.id);
        assert!(authorize(&store, &project, Some(&bob_ctx), ProjectAction::View).await.is_ok());
        assert!(authorize(&store, &project, Some(&bob_ctx), ProjectAction::MoveTask).await.is_ok());

        let err = authorize(&store, &project, Some(&bob_ctx), ProjectAction::Update)
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_outsider_is_forbidden_everywhere() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice").await;
        let mallory = store.add_user("mallory").await;
        let project = store.add_project(alice.id, "Proj").await;

        let ctx = AuthContext::new(mallory.id);
        for action in [ProjectAction::View, ProjectAction::ViewTasks, ProjectAction::Update] {
            let err = authorize(&store, &project, Some(&ctx), action).await.unwrap_err();
            assert!(matches!(err, TrackerError::Forbidden(_)));
        }
    }
}
