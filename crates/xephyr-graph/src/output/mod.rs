//! Output formatting for CLI commands.
//!
//! Every command prints either human-readable text or, with `--json`, the
//! serialized result. Text renderers return a `String` so they can be tested
//! without capturing stdout.

pub mod color;

use crate::domain::TaskId;
use crate::graph::ValidationResult;
use crate::report::{ChainPosition, DependencyGraphView, TaskDependencyReport};
use crate::schedule::{CriticalPathResult, ImpactOutcome, ScheduleWarning};
use crate::status::DependencyStatus;
use serde::Serialize;
use std::collections::HashSet;
use std::env;
use std::fmt::Write as _;
use std::io::{self, Write};

pub use color::{error, info, success, warning};

use color::{bold, colorize_dependency_status, colorize_status, dimmed};

/// Output mode for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text
    Text,
    /// JSON for programmatic use
    Json,
}

/// Settings that control text rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Read settings from the environment.
    ///
    /// Colors are disabled by `NO_COLOR` (any value) or by
    /// `XEPHYR_COLOR=0`/`false`.
    pub fn from_env() -> Self {
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("XEPHYR_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);
        Self { use_colors }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

/// Print any serializable value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// Print text followed by a newline.
pub fn print_text(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", text.trim_end())
}

fn hours(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}h")
    } else {
        format!("{value:.2}h")
    }
}

fn render_warnings(out: &mut String, warnings: &[ScheduleWarning], config: &OutputConfig) {
    for w in warnings {
        match w {
            ScheduleWarning::NegativeStartClamped {
                task_id,
                unclamped_start_hours,
            } => {
                let _ = writeln!(
                    out,
                    "{} {} would start at {}; clamped to project start",
                    warning("warning:", config),
                    info(task_id.as_str(), config),
                    hours(*unclamped_start_hours)
                );
            }
        }
    }
}

/// Render a critical path result.
pub fn render_critical_path(result: &CriticalPathResult, config: &OutputConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        bold("Project duration:", config),
        hours(result.project_duration_hours)
    );

    if result.critical_task_ids.is_empty() {
        let _ = writeln!(out, "No tasks.");
    } else {
        let chain: Vec<String> = result
            .critical_task_ids
            .iter()
            .map(|id| error(id.as_str(), config))
            .collect();
        let _ = writeln!(out, "{} {}", bold("Critical path:", config), chain.join(" -> "));
    }

    let non_critical = result.non_critical();
    if !non_critical.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", bold("Non-critical tasks:", config));
        for (id, float) in non_critical {
            let _ = writeln!(
                out,
                "  {} {} {}",
                info(id.as_str(), config),
                dimmed("float", config),
                warning(&hours(float), config)
            );
        }
    }

    render_warnings(&mut out, &result.warnings, config);
    out
}

/// Render a dependency validation.
pub fn render_validation(result: &ValidationResult, config: &OutputConfig) -> String {
    match &result.rejection {
        None => format!("{}\n", success("Dependency is valid", config)),
        Some(rejection) => format!("{} {rejection}\n", error("Rejected:", config)),
    }
}

/// Render an impact analysis.
pub fn render_impact(outcome: &ImpactOutcome, config: &OutputConfig) -> String {
    let impact = match outcome {
        ImpactOutcome::Rejected(validation) => return render_validation(validation, config),
        ImpactOutcome::Analyzed(impact) => impact,
    };

    let mut out = String::new();
    let delay = hours(impact.estimated_delay_hours);
    let delay = if impact.estimated_delay_hours > 0.0 {
        error(&delay, config)
    } else {
        success(&delay, config)
    };
    let _ = writeln!(
        out,
        "{} {} ({} -> {})",
        bold("Estimated delay:", config),
        delay,
        hours(impact.baseline_duration_hours),
        hours(impact.projected_duration_hours)
    );
    let _ = writeln!(
        out,
        "{} {}",
        bold("Critical path changed:", config),
        if impact.critical_path_changed { "yes" } else { "no" }
    );
    if impact.affected_task_ids.is_empty() {
        let _ = writeln!(out, "{} none", bold("Affected tasks:", config));
    } else {
        let ids: Vec<String> = impact
            .affected_task_ids
            .iter()
            .map(|id| info(id.as_str(), config))
            .collect();
        let _ = writeln!(out, "{} {}", bold("Affected tasks:", config), ids.join(", "));
    }
    render_warnings(&mut out, &impact.warnings, config);
    out
}

/// Render a set of task IDs, sorted.
pub fn render_task_set(label: &str, tasks: &HashSet<TaskId>, config: &OutputConfig) -> String {
    let mut sorted: Vec<&TaskId> = tasks.iter().collect();
    sorted.sort();

    let mut out = format!("{} ({})\n", bold(label, config), sorted.len());
    for id in sorted {
        let _ = writeln!(out, "  {}", info(id.as_str(), config));
    }
    out
}

/// Render a ready/blocked status.
pub fn render_status(task: &TaskId, status: DependencyStatus, config: &OutputConfig) -> String {
    format!(
        "{}: {}\n",
        info(task.as_str(), config),
        colorize_dependency_status(status, config)
    )
}

/// Render a task dependency report.
pub fn render_report(report: &TaskDependencyReport, config: &OutputConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", bold(report.task_id.as_str(), config));

    let _ = writeln!(out, "{}", dimmed("Depends on:", config));
    if report.dependencies.direct.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for dep in &report.dependencies.direct {
        let marker = if dep.is_blocking {
            error("blocking", config)
        } else {
            success("satisfied", config)
        };
        let _ = writeln!(
            out,
            "  {} [{}] {} {}",
            info(dep.depends_on_task_id.as_str(), config),
            dep.dependency_type,
            colorize_status(dep.status, config),
            marker
        );
    }
    for path in &report.dependencies.indirect {
        let ids: Vec<&str> = path.path.iter().map(TaskId::as_str).collect();
        let _ = writeln!(out, "  {} {}", dimmed(&format!("depth {}", path.depth), config), ids.join(" -> "));
    }

    let _ = writeln!(out, "{}", dimmed("Depended on by:", config));
    if report.dependents.direct.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for dependent in &report.dependents.direct {
        let marker = if dependent.is_blocked {
            error("blocked", config)
        } else {
            success("unblocked", config)
        };
        let _ = writeln!(
            out,
            "  {} [{}] {}",
            info(dependent.task_id.as_str(), config),
            dependent.dependency_type,
            marker
        );
    }
    for path in &report.dependents.indirect {
        let ids: Vec<&str> = path.path.iter().map(TaskId::as_str).collect();
        let _ = writeln!(out, "  {} {}", dimmed(&format!("depth {}", path.depth), config), ids.join(" -> "));
    }

    let position = match report.chain.position {
        ChainPosition::OnPath => error("on critical path", config),
        ChainPosition::OffPath => success("off critical path", config),
    };
    let _ = writeln!(
        out,
        "{} longest chain {}, {}, float {}",
        dimmed("Chain:", config),
        report.chain.longest_chain,
        position,
        hours(report.chain.float_hours)
    );
    out
}

/// Render the laid-out project graph as a node and edge listing.
pub fn render_graph(view: &DependencyGraphView, config: &OutputConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", bold("Nodes", config), view.nodes.len());
    for node in &view.nodes {
        let id = if node.critical {
            error(node.id.as_str(), config)
        } else {
            info(node.id.as_str(), config)
        };
        let _ = writeln!(
            out,
            "  {} {} ({}, {}) {}",
            id,
            colorize_status(node.status, config),
            node.x,
            node.y,
            node.title
        );
    }
    let _ = writeln!(out, "{} ({})", bold("Edges", config), view.edges.len());
    for edge in &view.edges {
        let lag = if edge.lag_hours > 0.0 {
            format!(" +{}", hours(edge.lag_hours))
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            "  {} {} -> {} [{}]{}",
            dimmed(edge.id.as_str(), config),
            edge.source,
            edge.target,
            edge.dependency_type,
            lag
        );
    }
    out
}
