//! Application context for CLI command execution.
//!
//! The CLI works on one snapshot file at a time: it is read into an
//! [`InMemorySnapshotStore`] under a project named after the file stem, and
//! every command runs through the [`GraphDependencyService`].

use crate::config::{EngineConfig, CONFIG_FILE_NAME};
use crate::domain::{ProjectId, Snapshot};
use crate::error::Result;
use crate::service::{GraphDependencyService, InMemorySnapshotStore};
use std::path::Path;
use tokio::fs;

/// Application context for CLI operations.
pub struct App {
    service: GraphDependencyService<InMemorySnapshotStore>,
    project: ProjectId,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("project", &self.project)
            .field("service", &"<GraphDependencyService>")
            .finish()
    }
}

impl App {
    /// Load a snapshot file and the engine configuration.
    ///
    /// Without an explicit `config_path`, `xephyr-graph.yaml` in the current
    /// directory is used if present, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be read or parsed.
    pub async fn load(snapshot_path: &Path, config_path: Option<&Path>) -> Result<Self> {
        let config = load_config(config_path).await?;

        let content = fs::read_to_string(snapshot_path).await?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;

        let project = ProjectId::new(
            snapshot_path
                .file_stem()
                .map_or_else(|| "snapshot".to_string(), |s| s.to_string_lossy().into_owned()),
        );

        tracing::debug!(
            project = %project,
            tasks = snapshot.tasks.len(),
            edges = snapshot.edges.len(),
            "Loaded snapshot"
        );

        let store = InMemorySnapshotStore::with_project(project.clone(), snapshot);
        Ok(Self {
            service: GraphDependencyService::new(store, config),
            project,
        })
    }

    /// The dependency service over the loaded snapshot.
    pub fn service(&self) -> &GraphDependencyService<InMemorySnapshotStore> {
        &self.service
    }

    /// Project ID the snapshot was loaded under.
    pub fn project(&self) -> &ProjectId {
        &self.project
    }
}

async fn load_config(explicit: Option<&Path>) -> Result<EngineConfig> {
    if let Some(path) = explicit {
        return EngineConfig::load(path).await;
    }
    let default_path = Path::new(CONFIG_FILE_NAME);
    if fs::try_exists(default_path).await.unwrap_or(false) {
        tracing::debug!(path = %default_path.display(), "Using configuration file");
        return EngineConfig::load(default_path).await;
    }
    Ok(EngineConfig::default())
}
