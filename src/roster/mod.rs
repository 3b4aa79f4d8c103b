pub mod types;
pub mod parser;

// Re-export the main API for easier access
pub use types::{Class, ClassSnapshot, StatusChange, Student, SubmissionStatus};
pub use parser::RosterParser;
