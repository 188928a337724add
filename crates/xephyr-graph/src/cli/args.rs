//! CLI argument structs for all commands.

use clap::{Parser, Subcommand};

use super::types::DependencyTypeArg;
use super::validators::{parse_delta_hours, parse_hours, validate_task_id};

/// Arguments naming a single task
#[derive(Parser, Debug, Clone)]
pub struct TaskArgs {
    /// Task ID
    #[arg(value_parser = validate_task_id)]
    pub task: String,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// The dependent task
    #[arg(long, value_parser = validate_task_id)]
    pub task: String,

    /// The task it would depend on
    #[arg(long, value_parser = validate_task_id)]
    pub depends_on: String,
}

/// Arguments for the `impact` command
#[derive(Parser, Debug, Clone)]
pub struct ImpactArgs {
    /// The hypothetical change
    #[command(subcommand)]
    pub action: ImpactAction,
}

/// Hypothetical changes understood by `impact`
#[derive(Subcommand, Debug, Clone)]
pub enum ImpactAction {
    /// Add a dependency edge
    AddEdge {
        /// The dependent task
        #[arg(long, value_parser = validate_task_id)]
        task: String,

        /// The task it would depend on
        #[arg(long, value_parser = validate_task_id)]
        depends_on: String,

        /// Dependency type
        #[arg(short = 't', long = "type", value_enum, default_value_t = DependencyTypeArg::FinishToStart)]
        dependency_type: DependencyTypeArg,

        /// Lag in hours
        #[arg(long, value_parser = parse_hours, default_value = "0")]
        lag: f64,
    },

    /// Change a task's estimated duration
    Duration {
        /// The task whose estimate changes
        #[arg(long, value_parser = validate_task_id)]
        task: String,

        /// Hours to add (negative to shorten)
        #[arg(long, value_parser = parse_delta_hours, allow_hyphen_values = true)]
        delta: f64,
    },
}

/// Arguments for the `report` command
#[derive(Parser, Debug, Clone)]
pub struct ReportArgs {
    /// Task ID
    #[arg(value_parser = validate_task_id)]
    pub task: String,

    /// Include transitive dependencies and dependents
    #[arg(long)]
    pub indirect: bool,
}
