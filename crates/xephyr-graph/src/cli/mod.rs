//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `critical-path`: CPM schedule and critical chain
//! - `validate`: check a proposed dependency
//! - `impact`: what-if analysis of a new edge or a duration change
//! - `descendants` / `ancestors`: transitive successors / predecessors
//! - `status`: ready or blocked
//! - `report`: dependency report for one task
//! - `graph`: laid-out project graph
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//! - `--config FILE`: Engine configuration (defaults to `./xephyr-graph.yaml`)
//!
//! # Example
//!
//! ```bash
//! xephyr-graph project.json critical-path
//! xephyr-graph project.json validate --task task-1 --depends-on task-3
//! xephyr-graph --json project.json impact add-edge --task b --depends-on a --lag 8
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use args::{ImpactAction, ImpactArgs, ReportArgs, TaskArgs, ValidateArgs};
pub use types::DependencyTypeArg;
pub use validators::{parse_delta_hours, parse_hours, validate_task_id};

/// xephyr-graph - task dependency graph and critical path scheduling
///
/// Reads a project snapshot (JSON with `tasks` and `edges`) and answers
/// scheduling questions about it. The snapshot file is never modified.
#[derive(Parser, Debug)]
#[command(name = "xephyr-graph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Engine configuration file (YAML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project snapshot file (JSON)
    pub snapshot: PathBuf,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compute the critical path
    ///
    /// Prints the project duration, the critical chain and the float of
    /// every non-critical task.
    CriticalPath,

    /// Validate a proposed dependency
    ///
    /// Checks for self-dependencies, duplicates and cycles without
    /// changing anything.
    Validate(ValidateArgs),

    /// Analyze the impact of a hypothetical change
    Impact(ImpactArgs),

    /// List every task that transitively depends on a task
    Descendants(TaskArgs),

    /// List every task a task transitively depends on
    Ancestors(TaskArgs),

    /// Show whether a task is ready to start
    Status(TaskArgs),

    /// Show a task's dependencies, dependents and chain position
    Report(ReportArgs),

    /// Show the laid-out project graph
    Graph,
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let app = App::load(&self.snapshot, self.config.as_deref()).await?;

        match &self.command {
            Commands::CriticalPath => execute::execute_critical_path(&app, output_mode).await,
            Commands::Validate(args) => execute::execute_validate(&app, args, output_mode).await,
            Commands::Impact(args) => execute::execute_impact(&app, args, output_mode).await,
            Commands::Descendants(args) => {
                execute::execute_descendants(&app, args, output_mode).await
            }
            Commands::Ancestors(args) => execute::execute_ancestors(&app, args, output_mode).await,
            Commands::Status(args) => execute::execute_status(&app, args, output_mode).await,
            Commands::Report(args) => execute::execute_report(&app, args, output_mode).await,
            Commands::Graph => execute::execute_graph(&app, output_mode).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_critical_path() {
        let cli = Cli::try_parse_from(["xephyr-graph", "p.json", "critical-path"]).unwrap();
        assert_eq!(cli.snapshot, PathBuf::from("p.json"));
        assert!(matches!(cli.command, Commands::CriticalPath));
        assert!(!cli.json);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "xephyr-graph",
            "p.json",
            "graph",
            "--json",
            "--config",
            "engine.yaml",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("engine.yaml")));
    }

    #[test]
    fn test_parse_validate() {
        let cli = Cli::try_parse_from([
            "xephyr-graph",
            "p.json",
            "validate",
            "--task",
            "a",
            "--depends-on",
            "b",
        ])
        .unwrap();
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.task, "a");
                assert_eq!(args.depends_on, "b");
            }
            other => panic!("Expected Validate command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_impact_add_edge_defaults() {
        let cli = Cli::try_parse_from([
            "xephyr-graph",
            "p.json",
            "impact",
            "add-edge",
            "--task",
            "b",
            "--depends-on",
            "a",
        ])
        .unwrap();
        match cli.command {
            Commands::Impact(ImpactArgs {
                action:
                    ImpactAction::AddEdge {
                        dependency_type,
                        lag,
                        ..
                    },
            }) => {
                assert_eq!(dependency_type, DependencyTypeArg::FinishToStart);
                assert_eq!(lag, 0.0);
            }
            other => panic!("Expected impact add-edge, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_impact_negative_delta() {
        let cli = Cli::try_parse_from([
            "xephyr-graph",
            "p.json",
            "impact",
            "duration",
            "--task",
            "a",
            "--delta",
            "-4",
        ])
        .unwrap();
        match cli.command {
            Commands::Impact(ImpactArgs {
                action: ImpactAction::Duration { delta, .. },
            }) => assert_eq!(delta, -4.0),
            other => panic!("Expected impact duration, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_negative_lag() {
        let result = Cli::try_parse_from([
            "xephyr-graph",
            "p.json",
            "impact",
            "add-edge",
            "--task",
            "b",
            "--depends-on",
            "a",
            "--lag=-2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_report_indirect() {
        let cli =
            Cli::try_parse_from(["xephyr-graph", "p.json", "report", "t1", "--indirect"]).unwrap();
        match cli.command {
            Commands::Report(args) => {
                assert_eq!(args.task, "t1");
                assert!(args.indirect);
            }
            other => panic!("Expected Report command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_requires_snapshot() {
        assert!(Cli::try_parse_from(["xephyr-graph"]).is_err());
    }
}
