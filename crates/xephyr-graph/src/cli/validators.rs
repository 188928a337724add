//! CLI input validation functions.
//!
//! Used by clap's `value_parser` attribute so invalid input is reported at
//! parse time.

/// Validate a task ID: non-empty, no whitespace.
pub fn validate_task_id(s: &str) -> Result<String, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Task ID cannot be empty".to_string());
    }
    if s.chars().any(char::is_whitespace) {
        return Err(format!("Task ID '{s}' cannot contain whitespace"));
    }
    Ok(s.to_string())
}

/// Parse a non-negative number of hours (lags).
pub fn parse_hours(s: &str) -> Result<f64, String> {
    let value = parse_finite(s)?;
    if value < 0.0 {
        return Err(format!("Hours cannot be negative (got {value})"));
    }
    Ok(value)
}

/// Parse a signed number of hours (duration deltas).
pub fn parse_delta_hours(s: &str) -> Result<f64, String> {
    parse_finite(s)
}

fn parse_finite(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if !value.is_finite() {
        return Err(format!("'{s}' is not a finite number"));
    }
    Ok(value)
}
