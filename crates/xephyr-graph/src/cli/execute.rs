//! Command execution functions.
//!
//! Each function runs one command against the [`App`] and prints the result
//! in the requested [`OutputMode`].

use anyhow::Result;

use super::args::{ImpactAction, ImpactArgs, ReportArgs, TaskArgs, ValidateArgs};
use crate::app::App;
use crate::domain::{Mutation, TaskId};
use crate::output::{self, OutputConfig, OutputMode};
use crate::service::DependencyService;

/// Execute the critical-path command
pub async fn execute_critical_path(app: &App, output_mode: OutputMode) -> Result<()> {
    let result = app.service().compute_critical_path(app.project()).await?;

    match output_mode {
        OutputMode::Json => output::print_json(&result)?,
        OutputMode::Text => output::print_text(&output::render_critical_path(
            &result,
            &OutputConfig::from_env(),
        ))?,
    }
    Ok(())
}

/// Execute the validate command
pub async fn execute_validate(app: &App, args: &ValidateArgs, output_mode: OutputMode) -> Result<()> {
    let result = app
        .service()
        .validate_dependency(
            app.project(),
            &TaskId::new(&args.task),
            &TaskId::new(&args.depends_on),
        )
        .await?;

    match output_mode {
        OutputMode::Json => output::print_json(&result)?,
        OutputMode::Text => {
            output::print_text(&output::render_validation(&result, &OutputConfig::from_env()))?;
        }
    }
    Ok(())
}

/// Execute the impact command
pub async fn execute_impact(app: &App, args: &ImpactArgs, output_mode: OutputMode) -> Result<()> {
    let mutation = match &args.action {
        ImpactAction::AddEdge {
            task,
            depends_on,
            dependency_type,
            lag,
        } => Mutation::AddEdge {
            task: TaskId::new(task),
            depends_on: TaskId::new(depends_on),
            dependency_type: (*dependency_type).into(),
            lag_hours: *lag,
        },
        ImpactAction::Duration { task, delta } => Mutation::ChangeDuration {
            task: TaskId::new(task),
            delta_hours: *delta,
        },
    };

    let outcome = app
        .service()
        .analyze_dependency_impact(app.project(), &mutation)
        .await?;

    match output_mode {
        OutputMode::Json => output::print_json(&outcome)?,
        OutputMode::Text => {
            output::print_text(&output::render_impact(&outcome, &OutputConfig::from_env()))?;
        }
    }
    Ok(())
}

/// Execute the descendants command
pub async fn execute_descendants(app: &App, args: &TaskArgs, output_mode: OutputMode) -> Result<()> {
    let tasks = app
        .service()
        .descendants(app.project(), &TaskId::new(&args.task))
        .await?;
    print_task_set("Descendants", tasks, output_mode)
}

/// Execute the ancestors command
pub async fn execute_ancestors(app: &App, args: &TaskArgs, output_mode: OutputMode) -> Result<()> {
    let tasks = app
        .service()
        .ancestors(app.project(), &TaskId::new(&args.task))
        .await?;
    print_task_set("Ancestors", tasks, output_mode)
}

fn print_task_set(
    label: &str,
    tasks: std::collections::HashSet<TaskId>,
    output_mode: OutputMode,
) -> Result<()> {
    match output_mode {
        OutputMode::Json => {
            let mut sorted: Vec<TaskId> = tasks.into_iter().collect();
            sorted.sort();
            output::print_json(&sorted)?;
        }
        OutputMode::Text => {
            output::print_text(&output::render_task_set(label, &tasks, &OutputConfig::from_env()))?;
        }
    }
    Ok(())
}

/// Execute the status command
pub async fn execute_status(app: &App, args: &TaskArgs, output_mode: OutputMode) -> Result<()> {
    let task = TaskId::new(&args.task);
    let status = app.service().dependency_status(app.project(), &task).await?;

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "taskId": task,
            "status": status,
        }))?,
        OutputMode::Text => {
            output::print_text(&output::render_status(&task, status, &OutputConfig::from_env()))?;
        }
    }
    Ok(())
}

/// Execute the report command
pub async fn execute_report(app: &App, args: &ReportArgs, output_mode: OutputMode) -> Result<()> {
    let report = app
        .service()
        .task_dependencies(app.project(), &TaskId::new(&args.task), args.indirect)
        .await?;

    match output_mode {
        OutputMode::Json => output::print_json(&report)?,
        OutputMode::Text => {
            output::print_text(&output::render_report(&report, &OutputConfig::from_env()))?;
        }
    }
    Ok(())
}

/// Execute the graph command
pub async fn execute_graph(app: &App, output_mode: OutputMode) -> Result<()> {
    let view = app.service().dependency_graph(app.project()).await?;

    match output_mode {
        OutputMode::Json => output::print_json(&view)?,
        OutputMode::Text => {
            output::print_text(&output::render_graph(&view, &OutputConfig::from_env()))?;
        }
    }
    Ok(())
}
