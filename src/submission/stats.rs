use std::path::PathBuf;

use serde::Serialize;

/// Counters for one scan cycle
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Regular files found in the submission folder
    pub total_files: usize,

    /// Files matched to a student with content
    pub matched_files: usize,

    /// Files matched to a student but zero bytes long
    pub empty_files: usize,

    /// Files that matched no student
    pub unrecognised_files: usize,

    /// Number of entries skipped because they could not be read
    pub skipped_files: usize,

    /// Paths of the skipped entries
    pub skipped_file_paths: Vec<PathBuf>,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files that were attributed to some student
    pub fn attributed_files(&self) -> usize {
        self.matched_files + self.empty_files
    }

    /// Percentage of listed files attributed to a student
    pub fn attribution_rate(&self) -> f64 {
        if self.total_files == 0 {
            return 0.0;
        }

        (self.attributed_files() as f64 / self.total_files as f64) * 100.0
    }
}
