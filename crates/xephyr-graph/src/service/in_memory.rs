//! Ephemeral snapshot store held in RAM.

use super::SnapshotStore;
use crate::domain::{DependencyEdge, EdgeId, ProjectId, Snapshot, Task};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Thread-safe map of project snapshots.
///
/// Cloning is cheap and shares the underlying data.
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotStore {
    projects: Arc<RwLock<HashMap<ProjectId, Snapshot>>>,
}

impl InMemorySnapshotStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding a single project.
    #[must_use]
    pub fn with_project(project: ProjectId, snapshot: Snapshot) -> Self {
        Self {
            projects: Arc::new(RwLock::new(HashMap::from([(project, snapshot)]))),
        }
    }

    /// Add or replace a project's snapshot.
    pub async fn insert_project(&self, project: ProjectId, snapshot: Snapshot) {
        self.projects.write().await.insert(project, snapshot);
    }

    /// A copy of the project's current snapshot.
    pub async fn snapshot(&self, project: &ProjectId) -> Option<Snapshot> {
        self.projects.read().await.get(project).cloned()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn list_tasks(&self, project: &ProjectId) -> Result<Vec<Task>> {
        let projects = self.projects.read().await;
        let snapshot = projects
            .get(project)
            .ok_or_else(|| Error::ProjectNotFound(project.clone()))?;
        Ok(snapshot.tasks.clone())
    }

    async fn list_dependency_edges(&self, project: &ProjectId) -> Result<Vec<DependencyEdge>> {
        let projects = self.projects.read().await;
        let snapshot = projects
            .get(project)
            .ok_or_else(|| Error::ProjectNotFound(project.clone()))?;
        Ok(snapshot.edges.clone())
    }

    async fn load_snapshot(&self, project: &ProjectId) -> Result<Snapshot> {
        self.snapshot(project)
            .await
            .ok_or_else(|| Error::ProjectNotFound(project.clone()))
    }

    async fn insert_dependency_edge(
        &self,
        project: &ProjectId,
        edge: DependencyEdge,
    ) -> Result<()> {
        let mut projects = self.projects.write().await;
        let snapshot = projects
            .get_mut(project)
            .ok_or_else(|| Error::ProjectNotFound(project.clone()))?;
        snapshot.edges.push(edge);
        Ok(())
    }

    async fn remove_dependency_edge(
        &self,
        project: &ProjectId,
        edge: &EdgeId,
    ) -> Result<DependencyEdge> {
        let mut projects = self.projects.write().await;
        let snapshot = projects
            .get_mut(project)
            .ok_or_else(|| Error::ProjectNotFound(project.clone()))?;
        let index = snapshot
            .edges
            .iter()
            .position(|e| &e.id == edge)
            .ok_or_else(|| Error::DependencyNotFound(edge.clone()))?;
        Ok(snapshot.edges.remove(index))
    }
}
