//! Async service layer over a snapshot store.
//!
//! The engine itself is synchronous and works on one borrowed [`Snapshot`].
//! This layer loads snapshots through a [`SnapshotStore`], runs the engine on
//! them and commits new edges back.
//!
//! # Concurrency
//!
//! Two concurrent `create_dependency` calls could each validate against the
//! same snapshot and together commit a cycle. [`GraphDependencyService`]
//! therefore holds a per-project `tokio::sync::Mutex` across
//! "load → validate → analyze → insert" (and across deletes). Read-only
//! operations take no project lock.

mod in_memory;

pub use in_memory::InMemorySnapshotStore;

use crate::cancel::CancelSignal;
use crate::config::EngineConfig;
use crate::domain::{
    DependencyEdge, EdgeId, Mutation, NewDependency, ProjectId, Snapshot, Task, TaskId,
};
use crate::engine::Engine;
use crate::error::Result;
use crate::graph::ValidationResult;
use crate::id_generation::EdgeIdGenerator;
use crate::report::{DependencyGraphView, TaskDependencyReport};
use crate::schedule::{CriticalPathResult, ImpactOutcome, ImpactResult};
use crate::status::DependencyStatus;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;

/// Source of task and edge data, and sink for committed edges.
///
/// Implementations must be `Send + Sync` so the service can be shared across
/// async tasks.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// All tasks of the project.
    ///
    /// # Errors
    ///
    /// Returns `Error::ProjectNotFound` for an unknown project.
    async fn list_tasks(&self, project: &ProjectId) -> Result<Vec<Task>>;

    /// All dependency edges of the project.
    ///
    /// # Errors
    ///
    /// Returns `Error::ProjectNotFound` for an unknown project.
    async fn list_dependency_edges(&self, project: &ProjectId) -> Result<Vec<DependencyEdge>>;

    /// Persist a new edge.
    ///
    /// # Errors
    ///
    /// Returns `Error::ProjectNotFound` for an unknown project.
    async fn insert_dependency_edge(&self, project: &ProjectId, edge: DependencyEdge)
        -> Result<()>;

    /// Delete an edge, returning it.
    ///
    /// # Errors
    ///
    /// - `Error::ProjectNotFound` for an unknown project
    /// - `Error::DependencyNotFound` if the edge does not exist
    async fn remove_dependency_edge(
        &self,
        project: &ProjectId,
        edge: &EdgeId,
    ) -> Result<DependencyEdge>;

    /// Load tasks and edges together.
    async fn load_snapshot(&self, project: &ProjectId) -> Result<Snapshot> {
        let tasks = self.list_tasks(project).await?;
        let edges = self.list_dependency_edges(project).await?;
        Ok(Snapshot::new(tasks, edges))
    }
}

/// Result of a `create_dependency` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CreateOutcome {
    /// The edge was committed.
    Created {
        /// The stored edge, with its generated ID
        edge: DependencyEdge,
        /// Schedule impact of the new edge
        impact: ImpactResult,
    },

    /// The edge was refused; nothing was stored.
    Rejected(ValidationResult),
}

/// Project-scoped dependency operations.
#[async_trait]
pub trait DependencyService: Send + Sync {
    /// Check whether "`task` depends on `depends_on`" may be added.
    async fn validate_dependency(
        &self,
        project: &ProjectId,
        task: &TaskId,
        depends_on: &TaskId,
    ) -> Result<ValidationResult>;

    /// Critical path of the project.
    async fn compute_critical_path(&self, project: &ProjectId) -> Result<CriticalPathResult>;

    /// Evaluate a mutation without committing it.
    async fn analyze_dependency_impact(
        &self,
        project: &ProjectId,
        mutation: &Mutation,
    ) -> Result<ImpactOutcome>;

    /// Transitive successors of a task.
    async fn descendants(&self, project: &ProjectId, task: &TaskId) -> Result<HashSet<TaskId>>;

    /// Transitive predecessors of a task.
    async fn ancestors(&self, project: &ProjectId, task: &TaskId) -> Result<HashSet<TaskId>>;

    /// Ready/blocked status of a task.
    async fn dependency_status(
        &self,
        project: &ProjectId,
        task: &TaskId,
    ) -> Result<DependencyStatus>;

    /// Dependency report for one task.
    async fn task_dependencies(
        &self,
        project: &ProjectId,
        task: &TaskId,
        include_indirect: bool,
    ) -> Result<TaskDependencyReport>;

    /// Laid-out view of the project graph.
    async fn dependency_graph(&self, project: &ProjectId) -> Result<DependencyGraphView>;

    /// Validate, analyze and commit a new edge.
    async fn create_dependency(
        &self,
        project: &ProjectId,
        request: NewDependency,
    ) -> Result<CreateOutcome>;

    /// Remove an edge, returning it.
    async fn delete_dependency(&self, project: &ProjectId, edge: &EdgeId)
        -> Result<DependencyEdge>;
}

/// Lazily created per-project locks.
///
/// An entry whose `Arc` is held only by the map has no guard and no waiter;
/// such entries are pruned on every acquire, so the map stays bounded by the
/// number of projects with writes in flight.
#[derive(Default)]
struct ProjectLocks {
    locks: Mutex<HashMap<ProjectId, Arc<Mutex<()>>>>,
}

impl ProjectLocks {
    async fn acquire(&self, project: &ProjectId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|key, lock| key == project || Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(project.clone()).or_default())
        };
        lock.lock_owned().await
    }
}

/// [`DependencyService`] backed by the engine and a [`SnapshotStore`].
pub struct GraphDependencyService<S> {
    store: S,
    engine: Engine,
    locks: ProjectLocks,
    shutdown: CancellationToken,
}

impl<S: SnapshotStore> GraphDependencyService<S> {
    /// Create a service over `store`.
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self {
            store,
            engine: Engine::new(config),
            locks: ProjectLocks::default(),
            shutdown: CancellationToken::new(),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Cancel every in-flight and future computation.
    pub fn shutdown(&self) {
        tracing::info!("Shutting down dependency service");
        self.shutdown.cancel();
    }

    fn cancel_signal(&self) -> CancelSignal {
        CancelSignal::from_token(self.shutdown.child_token())
            .with_optional_timeout(self.engine.config().phase_deadline())
    }
}

#[async_trait]
impl<S: SnapshotStore> DependencyService for GraphDependencyService<S> {
    async fn validate_dependency(
        &self,
        project: &ProjectId,
        task: &TaskId,
        depends_on: &TaskId,
    ) -> Result<ValidationResult> {
        let snapshot = self.store.load_snapshot(project).await?;
        self.engine
            .validate_dependency(&snapshot, task, depends_on, &self.cancel_signal())
    }

    async fn compute_critical_path(&self, project: &ProjectId) -> Result<CriticalPathResult> {
        let snapshot = self.store.load_snapshot(project).await?;
        self.engine
            .compute_critical_path(&snapshot, &self.cancel_signal())
    }

    async fn analyze_dependency_impact(
        &self,
        project: &ProjectId,
        mutation: &Mutation,
    ) -> Result<ImpactOutcome> {
        let snapshot = self.store.load_snapshot(project).await?;
        self.engine
            .analyze_dependency_impact(&snapshot, mutation, &self.cancel_signal())
    }

    async fn descendants(&self, project: &ProjectId, task: &TaskId) -> Result<HashSet<TaskId>> {
        let snapshot = self.store.load_snapshot(project).await?;
        self.engine
            .descendants(&snapshot, task, &self.cancel_signal())
    }

    async fn ancestors(&self, project: &ProjectId, task: &TaskId) -> Result<HashSet<TaskId>> {
        let snapshot = self.store.load_snapshot(project).await?;
        self.engine.ancestors(&snapshot, task, &self.cancel_signal())
    }

    async fn dependency_status(
        &self,
        project: &ProjectId,
        task: &TaskId,
    ) -> Result<DependencyStatus> {
        let snapshot = self.store.load_snapshot(project).await?;
        self.engine.dependency_status(&snapshot, task)
    }

    async fn task_dependencies(
        &self,
        project: &ProjectId,
        task: &TaskId,
        include_indirect: bool,
    ) -> Result<TaskDependencyReport> {
        let snapshot = self.store.load_snapshot(project).await?;
        self.engine
            .task_dependencies(&snapshot, task, include_indirect, &self.cancel_signal())
    }

    async fn dependency_graph(&self, project: &ProjectId) -> Result<DependencyGraphView> {
        let snapshot = self.store.load_snapshot(project).await?;
        self.engine
            .dependency_graph(&snapshot, &self.cancel_signal())
    }

    async fn create_dependency(
        &self,
        project: &ProjectId,
        request: NewDependency,
    ) -> Result<CreateOutcome> {
        let _guard = self.locks.acquire(project).await;

        let snapshot = self.store.load_snapshot(project).await?;
        let outcome = self.engine.analyze_dependency_impact(
            &snapshot,
            &Mutation::from(&request),
            &self.cancel_signal(),
        )?;

        let impact = match outcome {
            ImpactOutcome::Analyzed(impact) => impact,
            ImpactOutcome::Rejected(validation) => {
                return Ok(CreateOutcome::Rejected(validation));
            }
        };

        let id = EdgeIdGenerator::new(snapshot.edges.iter().map(|e| e.id.clone()))
            .generate(&request)?;
        let edge = DependencyEdge::new(
            id,
            request.task_id.clone(),
            request.depends_on_task_id.clone(),
        )
        .with_type(request.dependency_type)
        .with_lag(request.lag_hours);

        self.store
            .insert_dependency_edge(project, edge.clone())
            .await?;

        tracing::info!(
            project = %project,
            edge = %edge.id,
            task = %edge.task_id,
            depends_on = %edge.depends_on_task_id,
            delay_hours = impact.estimated_delay_hours,
            "Created dependency"
        );

        Ok(CreateOutcome::Created { edge, impact })
    }

    async fn delete_dependency(
        &self,
        project: &ProjectId,
        edge: &EdgeId,
    ) -> Result<DependencyEdge> {
        let _guard = self.locks.acquire(project).await;
        let removed = self.store.remove_dependency_edge(project, edge).await?;
        tracing::info!(project = %project, edge = %edge, "Deleted dependency");
        Ok(removed)
    }
}
