//! Semantic validation of a loaded configuration.
//!
//! Parsing already guarantees the shape; this catches combinations that would
//! make a dialog unanswerable or confusing before any message is sent.

use std::collections::HashSet;

use crate::schema::{DialogDefaults, ParleyConfig, ScriptStep, StepKind};

/// Waits shorter than this are treated as already timed out by the runner.
const MIN_USEFUL_TIMEOUT_SECS: f64 = 2.0;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "script.steps[2].max"
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path, self.message)
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: impl Into<String>, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.into(),
            message: message.into(),
        });
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Error, path, message);
    }

    fn warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, path, message);
    }
}

/// Validate `config`, collecting every problem rather than stopping at the first.
pub fn validate(config: &ParleyConfig) -> ValidationResult {
    let mut result = ValidationResult::default();
    check_dialog(&config.dialog, &mut result);
    for (i, step) in config.script.steps.iter().enumerate() {
        check_step(&format!("script.steps[{i}]"), step, &mut result);
    }
    check_step_names(&config.script.steps, &mut result);
    result
}

fn check_dialog(dialog: &DialogDefaults, result: &mut ValidationResult) {
    let cancel = dialog.cancel_keyword.trim().to_lowercase();
    let skip = dialog.skip_keyword.trim().to_lowercase();

    if dialog.cancellable && cancel.is_empty() {
        result.error("dialog.cancel_keyword", "must not be empty when cancellable");
    }
    if dialog.skippable && skip.is_empty() {
        result.error("dialog.skip_keyword", "must not be empty when skippable");
    }
    if dialog.cancellable && dialog.skippable && !cancel.is_empty() && cancel == skip {
        result.error(
            "dialog.skip_keyword",
            format!("'{skip}' is also the cancel keyword; skipping would be unreachable"),
        );
    }
    if let Some(timeout) = dialog.timeout_secs {
        check_timeout("dialog.timeout_secs", timeout, result);
    }
}

fn check_timeout(path: &str, timeout: f64, result: &mut ValidationResult) {
    if timeout < 0.0 || !timeout.is_finite() {
        result.error(path, "must be a non-negative number of seconds");
    } else if timeout > 0.0 && timeout < MIN_USEFUL_TIMEOUT_SECS {
        result.warning(
            path,
            format!("below {MIN_USEFUL_TIMEOUT_SECS}s; questions will time out immediately"),
        );
    }
}

fn check_step(path: &str, step: &ScriptStep, result: &mut ValidationResult) {
    if step.name.trim().is_empty() {
        result.error(format!("{path}.name"), "must not be empty");
    }
    if let Some(timeout) = step.overrides.timeout_secs {
        check_timeout(&format!("{path}.overrides.timeout_secs"), timeout, result);
    }

    match &step.kind {
        StepKind::Prompt {
            length_secs,
            continue_keyword,
            ..
        } => {
            if length_secs.is_none() && continue_keyword.trim().is_empty() {
                result.error(
                    path.to_string(),
                    "prompt needs a length_secs or a continue_keyword",
                );
            }
            if let Some(length) = length_secs {
                check_timeout(&format!("{path}.length_secs"), *length, result);
            }
        },
        StepKind::Text { .. } => {},
        StepKind::Number { min, max, .. } => {
            if let (Some(min), Some(max)) = (min, max)
                && min > max
            {
                result.error(format!("{path}.min"), format!("{min} is greater than max {max}"));
            }
        },
        StepKind::Choice {
            choices,
            keys,
            min,
            max,
            ..
        } => {
            if choices.is_empty() {
                result.error(format!("{path}.choices"), "must not be empty");
            }
            if let Some(keys) = keys {
                if keys.len() != choices.len() {
                    result.error(
                        format!("{path}.keys"),
                        format!("{} keys for {} choices", keys.len(), choices.len()),
                    );
                }
                let mut seen = HashSet::new();
                for key in keys {
                    if !seen.insert(key) {
                        result.error(format!("{path}.keys"), format!("duplicate key '{key}'"));
                    }
                }
            }
            check_bounds(path, *min, *max, result);
            if let Some(max) = max
                && *max > choices.len()
            {
                result.error(
                    format!("{path}.max"),
                    format!("{max} exceeds the {} available choices", choices.len()),
                );
            }
        },
        StepKind::File {
            min,
            max,
            finished_keyword,
            ..
        } => {
            check_bounds(path, *min, *max, result);
            if finished_keyword.trim().is_empty() {
                result.error(format!("{path}.finished_keyword"), "must not be empty");
            }
        },
    }
}

fn check_bounds(path: &str, min: Option<usize>, max: Option<usize>, result: &mut ValidationResult) {
    if let (Some(min), Some(max)) = (min, max)
        && min > max
    {
        result.error(format!("{path}.min"), format!("{min} is greater than max {max}"));
    }
}

fn check_step_names(steps: &[ScriptStep], result: &mut ValidationResult) {
    let mut seen = HashSet::new();
    for (i, step) in steps.iter().enumerate() {
        if !step.name.is_empty() && !seen.insert(step.name.as_str()) {
            result.warning(
                format!("script.steps[{i}].name"),
                format!("'{}' repeats an earlier step; its answer overwrites", step.name),
            );
        }
    }
}
