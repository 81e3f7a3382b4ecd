/// In-memory [`ProjectStore`] for tests
///
/// All state sits behind one `RwLock`; the column append and the task edit
/// take the write lock for their read-then-write, which gives them the same
/// atomicity as the PostgreSQL transaction. Seeding helpers mirror the production write paths
/// (creating a project also creates the owner's OWNER membership).

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{ProjectStore, StoreError, StoreResult};
use crate::board::next_order;
use crate::models::membership::{Membership, MembershipRole};
use crate::models::project::{Project, ProjectStatus};
use crate::models::task::{Task, TaskFilter, TaskPriority, TaskStatus, UpdateTask};
use crate::models::user::User;

/// Thread-safe in-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    sequences: Sequences,
    users: HashMap<i64, User>,
    projects: HashMap<i64, Project>,
    memberships: HashMap<(i64, i64), Membership>,
    tasks: HashMap<i64, Task>,
}

/// One id sequence per table, like BIGSERIAL columns
#[derive(Debug, Default)]
struct Sequences {
    users: i64,
    projects: i64,
    memberships: i64,
    tasks: i64,
}

fn next_id(sequence: &mut i64) -> i64 {
    *sequence += 1;
    *sequence
}

impl MemoryState {
    /// Next free position in a column; caller holds the write lock
    fn claim_position(&self, project_id: i64, status: TaskStatus) -> StoreResult<i32> {
        let max = self
            .tasks
            .values()
            .filter(|t| t.project_id == project_id && t.status == status)
            .map(|t| t.order)
            .max();

        next_order(max).ok_or(StoreError::ColumnFull { project_id, status })
    }
}

impl MemoryStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provisions a user
    pub async fn add_user(&self, username: &str) -> User {
        let mut state = self.state.write().await;
        let user = User {
            id: next_id(&mut state.sequences.users),
            username: username.to_string(),
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        user
    }

    /// Creates a project owned by `owner_id` plus its OWNER membership
    pub async fn add_project(&self, owner_id: i64, name: &str) -> Project {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let project = Project {
            id: next_id(&mut state.sequences.projects),
            owner_id,
            name: name.to_string(),
            description: String::new(),
            status: ProjectStatus::default(),
            start_date: None,
            end_date: None,
            created_at: now,
            updated_at: now,
        };
        state.projects.insert(project.id, project.clone());

        let membership = Membership {
            id: next_id(&mut state.sequences.memberships),
            project_id: project.id,
            user_id: owner_id,
            role: MembershipRole::Owner,
            added_at: now,
        };
        state.memberships.insert((project.id, owner_id), membership);

        project
    }

    /// Adds a task at position 0 of its column
    pub async fn add_task(&self, project_id: i64, title: &str, status: TaskStatus) -> Task {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let task = Task {
            id: next_id(&mut state.sequences.tasks),
            project_id,
            title: title.to_string(),
            description: String::new(),
            status,
            priority: TaskPriority::default(),
            due_date: None,
            assignee_id: None,
            order: 0,
            created_at: now,
            updated_at: now,
        };
        state.tasks.insert(task.id, task.clone());
        task
    }

    /// Puts a task at an explicit column and position, bypassing the engine
    ///
    /// Returns `false` when the task does not exist.
    pub async fn seed_position(&self, task_id: i64, status: TaskStatus, order: i32) -> bool {
        let mut state = self.state.write().await;
        match state.tasks.get_mut(&task_id) {
            Some(task) => {
                task.status = status;
                task.order = order;
                true
            }
            None => false,
        }
    }

    /// Number of memberships of a project
    pub async fn membership_count(&self, project_id: i64) -> usize {
        let state = self.state.read().await;
        state.memberships.keys().filter(|(p, _)| *p == project_id).count()
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>> {
        Ok(self.state.read().await.projects.get(&id).cloned())
    }

    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>> {
        Ok(self.state.read().await.tasks.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn membership_role(&self, project_id: i64, user_id: i64) -> StoreResult<Option<MembershipRole>> {
        let state = self.state.read().await;
        Ok(state.memberships.get(&(project_id, user_id)).map(|m| m.role))
    }

    async fn upsert_membership(
        &self,
        project_id: i64,
        user_id: i64,
        role: MembershipRole,
    ) -> StoreResult<Membership> {
        let mut state = self.state.write().await;

        if !state.projects.contains_key(&project_id) {
            return Err(StoreError::Integrity(format!("project {project_id} does not exist")));
        }
        if !state.users.contains_key(&user_id) {
            return Err(StoreError::Integrity(format!("user {user_id} does not exist")));
        }

        if let Some(existing) = state.memberships.get_mut(&(project_id, user_id)) {
            existing.role = role;
            return Ok(existing.clone());
        }

        let membership = Membership {
            id: next_id(&mut state.sequences.memberships),
            project_id,
            user_id,
            role,
            added_at: Utc::now(),
        };
        state.memberships.insert((project_id, user_id), membership.clone());
        Ok(membership)
    }

    async fn delete_membership(&self, project_id: i64, user_id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.memberships.remove(&(project_id, user_id)).is_some())
    }

    async fn append_to_column(&self, task_id: i64, status: TaskStatus) -> StoreResult<Option<Task>> {
        let mut state = self.state.write().await;

        let Some(project_id) = state.tasks.get(&task_id).map(|t| t.project_id) else {
            return Ok(None);
        };
        let order = state.claim_position(project_id, status)?;

        let Some(task) = state.tasks.get_mut(&task_id) else {
            return Ok(None);
        };
        task.status = status;
        task.order = order;
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn update_task(
        &self,
        task_id: i64,
        data: UpdateTask,
        status: Option<TaskStatus>,
    ) -> StoreResult<Option<Task>> {
        let mut state = self.state.write().await;

        let Some((project_id, current)) = state.tasks.get(&task_id).map(|t| (t.project_id, t.status)) else {
            return Ok(None);
        };
        if let Some(id) = data.assignee_id {
            if !state.users.contains_key(&id) {
                return Err(StoreError::Integrity(format!("user {id} does not exist")));
            }
        }

        // Claim the position before touching the task so a failure writes nothing
        let position = match status {
            Some(status) if status != current => Some((status, state.claim_position(project_id, status)?)),
            _ => None,
        };

        let Some(task) = state.tasks.get_mut(&task_id) else {
            return Ok(None);
        };
        task.title = data.title;
        task.description = data.description;
        task.priority = data.priority;
        task.due_date = data.due_date;
        task.assignee_id = data.assignee_id;
        if let Some((status, order)) = position {
            task.status = status;
            task.order = order;
        }
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn projects_for_member(
        &self,
        user_id: i64,
        status: Option<ProjectStatus>,
    ) -> StoreResult<Vec<Project>> {
        let state = self.state.read().await;
        let mut projects: Vec<Project> = state
            .projects
            .values()
            .filter(|p| state.memberships.contains_key(&(p.id, user_id)))
            .filter(|p| status.map_or(true, |s| p.status == s))
            .cloned()
            .collect();

        projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(projects)
    }

    async fn tasks_in_project(&self, project_id: i64) -> StoreResult<Vec<Task>> {
        let state = self.state.read().await;
        let filter = TaskFilter {
            project: Some(project_id),
            ..Default::default()
        };
        Ok(state.tasks.values().filter(|t| filter.matches(t)).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_project_creates_owner_membership() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice").await;
        let project = store.add_project(alice.id, "Proj").await;

        let role = store.membership_role(project.id, alice.id).await.unwrap();
        assert_eq!(role, Some(MembershipRole::Owner));
        assert_eq!(store.membership_count(project.id).await, 1);
    }

    #[tokio::test]
    async fn test_upsert_membership_keeps_one_row() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice").await;
        let bob = store.add_user("bob").await;
        let project = store.add_project(alice.id, "Proj").await;

        let first = store.upsert_membership(project.id, bob.id, MembershipRole::Member).await.unwrap();
        let second = store.upsert_membership(project.id, bob.id, MembershipRole::Owner).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.role, MembershipRole::Owner);
        assert_eq!(store.membership_count(project.id).await, 2);
    }

    #[tokio::test]
    async fn test_upsert_membership_rejects_unknown_user() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice").await;
        let project = store.add_project(alice.id, "Proj").await;

        let err = store.upsert_membership(project.id, 999, MembershipRole::Member).await.unwrap_err();
        assert!(matches!(err, StoreError::Integrity(_)));
    }

    #[tokio::test]
    async fn test_append_to_column_missing_task() {
        let store = MemoryStore::new();
        let moved = store.append_to_column(42, TaskStatus::Done).await.unwrap();
        assert!(moved.is_none());
    }

    #[tokio::test]
    async fn test_append_ignores_other_projects() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice").await;
        let a = store.add_project(alice.id, "A").await;
        let b = store.add_project(alice.id, "B").await;

        let in_a = store.add_task(a.id, "a1", TaskStatus::Todo).await;
        let in_b = store.add_task(b.id, "b1", TaskStatus::Todo).await;

        store.append_to_column(in_a.id, TaskStatus::Done).await.unwrap();
        store.append_to_column(in_a.id, TaskStatus::Done).await.unwrap();

        let moved = store.append_to_column(in_b.id, TaskStatus::Done).await.unwrap().unwrap();
        assert_eq!(moved.order, 1);
    }

    fn edit(title: &str) -> UpdateTask {
        UpdateTask {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_append_to_full_column_fails() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice").await;
        let project = store.add_project(alice.id, "Proj").await;
        let last = store.add_task(project.id, "last", TaskStatus::Todo).await;
        let task = store.add_task(project.id, "T", TaskStatus::Todo).await;
        store.seed_position(last.id, TaskStatus::Done, i32::MAX).await;

        let err = store.append_to_column(task.id, TaskStatus::Done).await.unwrap_err();
        assert!(matches!(err, StoreError::ColumnFull { status: TaskStatus::Done, .. }));

        let stored = store.find_task(task.id).await.unwrap().unwrap();
        assert_eq!((stored.status, stored.order), (TaskStatus::Todo, 0));
    }

    #[tokio::test]
    async fn test_update_task_moves_when_status_changes() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice").await;
        let project = store.add_project(alice.id, "Proj").await;
        let done = store.add_task(project.id, "done", TaskStatus::Todo).await;
        let task = store.add_task(project.id, "T", TaskStatus::Todo).await;
        store.seed_position(done.id, TaskStatus::Done, 4).await;

        let updated = store
            .update_task(task.id, edit("Renamed"), Some(TaskStatus::Done))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!((updated.status, updated.order), (TaskStatus::Done, 5));

        // Same status keeps the position
        let again = store
            .update_task(task.id, edit("Renamed again"), Some(TaskStatus::Done))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(again.order, 5);
    }

    #[tokio::test]
    async fn test_failed_update_writes_nothing() {
        let store = MemoryStore::new();
        let alice = store.add_user("alice").await;
        let project = store.add_project(alice.id, "Proj").await;
        let last = store.add_task(project.id, "last", TaskStatus::Todo).await;
        let task = store.add_task(project.id, "T", TaskStatus::Todo).await;
        store.seed_position(last.id, TaskStatus::Done, i32::MAX).await;

        let err = store
            .update_task(task.id, edit("Renamed"), Some(TaskStatus::Done))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ColumnFull { .. }));

        let err = store
            .update_task(task.id, UpdateTask { assignee_id: Some(999), ..edit("Renamed") }, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Integrity(_)));

        let stored = store.find_task(task.id).await.unwrap().unwrap();
        assert_eq!(stored, task);
    }

    #[tokio::test]
    async fn test_update_missing_task() {
        let store = MemoryStore::new();
        let updated = store.update_task(7, edit("x"), None).await.unwrap();
        assert!(updated.is_none());
    }
}
