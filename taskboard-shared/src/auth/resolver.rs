/// Maps a request's identifiers to the project it concerns
///
/// Handlers see a mix of identifiers: a task handler has a bare `pk`, a
/// nested route has `project_pk`, and some handlers have already loaded the
/// entity. Resolution takes the first rule that applies:
///
/// 1. A loaded task: its project
/// 2. A loaded project: itself
/// 3. A `project_pk` route parameter: that project
/// 4. A bare `pk`: the task with that id (its project) if one exists,
///    otherwise the project with that id
///
/// Rule 4 tries tasks first, so a task route never authorizes against an
/// unrelated project that happens to share the numeric id.

use tracing::debug;

use crate::error::{TrackerError, TrackerResult};
use crate::models::project::Project;
use crate::models::task::Task;
use crate::store::ProjectStore;

/// Identifiers captured from the route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteParams {
    pub project_pk: Option<i64>,
    pub pk: Option<i64>,
}

impl RouteParams {
    pub fn pk(pk: i64) -> Self {
        Self { pk: Some(pk), project_pk: None }
    }

    pub fn project_pk(project_pk: i64) -> Self {
        Self { project_pk: Some(project_pk), pk: None }
    }
}

/// An entity the handler already loaded
#[derive(Debug, Clone, Copy)]
pub enum LoadedEntity<'a> {
    Task(&'a Task),
    Project(&'a Project),
}

/// Resolves the owning project
///
/// Read-only.
///
/// # Errors
///
/// `TrackerError::NotFound` when no rule yields a project
pub async fn resolve_project<S>(
    store: &S,
    params: &RouteParams,
    loaded: Option<LoadedEntity<'_>>,
) -> TrackerResult<Project>
where
    S: ProjectStore + ?Sized,
{
    match loaded {
        Some(LoadedEntity::Task(task)) => {
            return store
                .find_project(task.project_id)
                .await?
                .ok_or_else(|| TrackerError::not_found("project"));
        }
        Some(LoadedEntity::Project(project)) => return Ok(project.clone()),
        None => {}
    }

    if let Some(project_pk) = params.project_pk {
        return store
            .find_project(project_pk)
            .await?
            .ok_or_else(|| TrackerError::not_found("project"));
    }

    let Some(pk) = params.pk else {
        return Err(TrackerError::not_found("project"));
    };

    if let Some(task) = store.find_task(pk).await? {
        debug!(pk, project_id = task.project_id, "Resolved pk as task");
        return store
            .find_project(task.project_id)
            .await?
            .ok_or_else(|| TrackerError::not_found("project"));
    }

    debug!(pk, "No task with pk, resolving as project");
    store
        .find_project(pk)
        .await?
        .ok_or_else(|| TrackerError::not_found("project"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskStatus;
    use crate::store::memory::MemoryStore;

    async fn seeded() -> (MemoryStore, Project, Project, Task) {
        let store = MemoryStore::new();
        let alice = store.add_user("alice").await;
        let first = store.add_project(alice.id, "First").await;
        let second = store.add_project(alice.id, "Second").await;
        let task = store.add_task(second.id, "t", TaskStatus::Todo).await;
        (store, first, second, task)
    }

    #[tokio::test]
    async fn test_loaded_task_wins() {
        let (store, first, second, task) = seeded().await;

        let params = RouteParams { project_pk: Some(first.id), pk: Some(first.id) };
        let project = resolve_project(&store, &params, Some(LoadedEntity::Task(&task)))
            .await
            .unwrap();
        assert_eq!(project.id, second.id);
    }

    #[tokio::test]
    async fn test_loaded_project_is_returned() {
        let (store, first, _, _) = seeded().await;

        let project = resolve_project(&store, &RouteParams::default(), Some(LoadedEntity::Project(&first)))
            .await
            .unwrap();
        assert_eq!(project, first);
    }

    #[tokio::test]
    async fn test_project_pk_beats_pk() {
        let (store, first, _, task) = seeded().await;

        let params = RouteParams { project_pk: Some(first.id), pk: Some(task.id) };
        let project = resolve_project(&store, &params, None).await.unwrap();
        assert_eq!(project.id, first.id);
    }

    #[tokio::test]
    async fn test_missing_project_pk_is_not_found() {
        let (store, _, _, task) = seeded().await;

        let params = RouteParams { project_pk: Some(9999), pk: Some(task.id) };
        let err = resolve_project(&store, &params, None).await.unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_pk_tries_task_before_project() {
        let (store, first, second, task) = seeded().await;

        // Ids come from per-table sequences: task 1 and project 1 both exist
        assert_eq!(task.id, first.id);

        let project = resolve_project(&store, &RouteParams::pk(task.id), None).await.unwrap();
        assert_eq!(project.id, second.id);
    }

    #[tokio::test]
    async fn test_pk_falls_back_to_project() {
        let (store, _, second, _) = seeded().await;

        // No task has id 2
        let project = resolve_project(&store, &RouteParams::pk(second.id), None).await.unwrap();
        assert_eq!(project.id, second.id);
    }

    #[tokio::test]
    async fn test_nothing_resolves() {
        let (store, _, _, _) = seeded().await;

        let err = resolve_project(&store, &RouteParams::pk(9999), None).await.unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(_)));

        let err = resolve_project(&store, &RouteParams::default(), None).await.unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(_)));
    }
}
