pub mod error;
pub mod roster;
pub mod submission;
pub mod monitor;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export main types and functions for easier access
pub use error::{MonitorError, RosterViolation};
pub use roster::{Class, ClassSnapshot, RosterParser, StatusChange, Student, SubmissionStatus};
pub use submission::{MatchMode, MatchStrategy, ScanStats, SubmissionScanner};
pub use monitor::{Monitor, MonitorConfig, MonitorOutcome};

// Re-export utility functions
pub use utils::file_utils;
