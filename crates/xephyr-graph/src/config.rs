//! Engine configuration.
//!
//! Configuration is stored as YAML with kebab-case keys, e.g.
//!
//! ```yaml
//! float-tolerance-hours: 1.0e-9
//! max-tasks: 10000
//! phase-deadline-ms: 2000
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

/// Default tolerance below which a float value is treated as exactly zero
pub const DEFAULT_FLOAT_TOLERANCE_HOURS: f64 = 1e-9;

/// Default upper bound on tasks per snapshot
pub const DEFAULT_MAX_TASKS: usize = 10_000;

/// Name of the configuration file looked up by the CLI
pub const CONFIG_FILE_NAME: &str = "xephyr-graph.yaml";

/// Tunables for the scheduling engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EngineConfig {
    /// Float magnitudes at or below this are snapped to zero (critical).
    pub float_tolerance_hours: f64,

    /// Snapshots with more tasks than this are refused.
    pub max_tasks: usize,

    /// Optional wall-clock budget for a single engine call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_deadline_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            float_tolerance_hours: DEFAULT_FLOAT_TOLERANCE_HOURS,
            max_tasks: DEFAULT_MAX_TASKS,
            phase_deadline_ms: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file and validate it.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string and validate it.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if !self.float_tolerance_hours.is_finite() || self.float_tolerance_hours < 0.0 {
            return Err(Error::Config(format!(
                "float-tolerance-hours must be a finite, non-negative number (got {})",
                self.float_tolerance_hours
            )));
        }

        if self.max_tasks == 0 {
            return Err(Error::Config("max-tasks must be greater than 0".to_string()));
        }

        if self.phase_deadline_ms == Some(0) {
            return Err(Error::Config(
                "phase-deadline-ms must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }

    /// The per-call deadline, if configured.
    #[must_use]
    pub fn phase_deadline(&self) -> Option<Duration> {
        self.phase_deadline_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_tasks, DEFAULT_MAX_TASKS);
        assert!(config.phase_deadline().is_none());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = EngineConfig::from_yaml("max-tasks: 50\n").unwrap();
        assert_eq!(config.max_tasks, 50);
        assert_eq!(config.float_tolerance_hours, DEFAULT_FLOAT_TOLERANCE_HOURS);
    }

    #[test]
    fn test_rejects_negative_tolerance() {
        let err = EngineConfig::from_yaml("float-tolerance-hours: -1.0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_zero_max_tasks() {
        let err = EngineConfig::from_yaml("max-tasks: 0\n").unwrap_err();
        assert!(err.to_string().contains("max-tasks"));
    }

    #[test]
    fn test_rejects_unparseable_yaml() {
        assert!(EngineConfig::from_yaml("max-tasks: [nope").is_err());
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let config = EngineConfig {
            float_tolerance_hours: 0.001,
            max_tasks: 250,
            phase_deadline_ms: Some(1500),
        };
        config.save(&path).await.unwrap();

        let loaded = EngineConfig::load(&path).await.unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.phase_deadline(), Some(Duration::from_millis(1500)));
    }
}
