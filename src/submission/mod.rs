pub mod file_collector;
pub mod matcher;
pub mod scanner;
pub mod stats;

// Re-export from submodules
pub use file_collector::{DirectoryListing, FileCollector, SubmissionFile};
pub use matcher::{ExactTokenMatch, MatchMode, MatchStrategy, RegexMatch, SubstringMatch};
pub use scanner::{MatchOutcome, SubmissionScanner};
pub use stats::ScanStats;
