//! Errors and update reports
//!
//! `update()` never fails outward. Directive errors are turned into
//! `Issue`s, logged, and collected in an `UpdateReport`.

use fos_dom::DomError;
use serde::Serialize;

/// Failure applying a single directive
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UpdateError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("expected {expected}, got {found}")]
    InvalidValue {
        expected: &'static str,
        found: &'static str,
    },

    #[error("classList.replace needs exactly 2 class names, got {0}")]
    ReplaceArity(usize),

    #[error("handler for '{0}' is not a function")]
    NotAFunction(String),

    #[error("unknown classList operation '{0}'")]
    UnknownClassListOp(String),

    #[error("no directive, method or property named '{0}' and value is not a primitive")]
    Unrecognized(String),

    #[error("delegate failed: {0}")]
    Delegate(String),
}

impl UpdateError {
    pub(crate) fn invalid(expected: &'static str, found: &crate::Value) -> Self {
        Self::InvalidValue {
            expected,
            found: found.kind(),
        }
    }
}

/// Failure resolving a shortcut accessor
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AccessError {
    #[error("no accessor named '{0}'")]
    UnknownShortcut(String),

    #[error("accessor '{0}' is not callable")]
    NotCallable(String),

    #[error("accessor '{0}' has no update of its own")]
    NoNativeUpdate(String),

    #[error("missing argument for '{0}'")]
    MissingArgument(String),

    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

/// One logged problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    /// Update key the issue concerns, if any
    pub key: Option<String>,
    pub message: String,
}

/// Outcome of an update call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    /// Directives applied without error
    pub applied: usize,
    pub issues: Vec<Issue>,
}

impl UpdateReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn warn(&mut self, key: Option<&str>, message: impl Into<String>) {
        self.issues.push(Issue {
            severity: Severity::Warning,
            key: key.map(str::to_string),
            message: message.into(),
        });
    }

    pub(crate) fn info(&mut self, key: Option<&str>, message: impl Into<String>) {
        self.issues.push(Issue {
            severity: Severity::Info,
            key: key.map(str::to_string),
            message: message.into(),
        });
    }

    /// Fold another report into this one
    pub fn absorb(&mut self, other: UpdateReport) {
        self.applied += other.applied;
        self.issues.extend(other.issues);
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// No warnings (informational entries are fine)
    pub fn is_clean(&self) -> bool {
        self.warning_count() == 0
    }
}
