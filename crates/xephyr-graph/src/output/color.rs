//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Ready:   green   (done tasks, ready status, accepted edges)
//!   - Warning/Active:  yellow  (in-progress tasks, float, schedule warnings)
//!   - Error/Blocked:   red     (critical tasks, blocked status, rejections)
//!   - Info/Reference:  cyan    (task and edge IDs)
//!   - Muted:           dimmed  (field labels, backlog tasks)

use crate::domain::TaskStatus;
use crate::status::DependencyStatus;
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

/// Apply color to a task status.
pub(crate) fn colorize_status(status: TaskStatus, config: &OutputConfig) -> String {
    let text = status.to_string();
    match status {
        TaskStatus::Backlog => dimmed(&text, config),
        TaskStatus::Ready => text,
        TaskStatus::InProgress | TaskStatus::Review => warning(&text, config),
        TaskStatus::Done => success(&text, config),
    }
}

/// Apply color to a ready/blocked status.
pub(crate) fn colorize_dependency_status(status: DependencyStatus, config: &OutputConfig) -> String {
    let text = status.to_string();
    match status {
        DependencyStatus::Ready => success(&text, config),
        DependencyStatus::Blocked => error(&text, config),
    }
}
