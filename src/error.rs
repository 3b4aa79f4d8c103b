use std::path::PathBuf;

use thiserror::Error;

/// Structural problems found while reading a roster definition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterViolation {
    #[error("class already named; previous block not terminated")]
    ClassAlreadyNamed,

    #[error("path given before name")]
    PathBeforeName,

    #[error("duplicate path")]
    DuplicatePath,

    #[error("student listed before class fully declared")]
    StudentBeforeDeclared,
}

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("malformed roster at line {line}: {violation} ({content:?})")]
    MalformedRoster {
        line: usize,
        content: String,
        violation: RosterViolation,
    },

    #[error("failed to read roster {}", path.display())]
    RosterUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("submission path for class '{class}' is unavailable: {}", path.display())]
    PathUnavailable { class: String, path: PathBuf },

    #[error("invalid match pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("no class matches selection {0:?}")]
    InvalidSelection(String),
}

impl MonitorError {
    /// Whether the driving loop may keep going after this error
    pub fn is_transient(&self) -> bool {
        matches!(self, MonitorError::PathUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
