use log::{debug, info, warn};

use crate::error::{MonitorError, Result};
use crate::roster::{Class, Student, SubmissionStatus};
use super::file_collector::{DirectoryListing, FileCollector};
use super::matcher::{MatchStrategy, SubstringMatch};
use super::stats::ScanStats;

/// Result of matching one directory listing against a roster, not yet
/// applied to a class
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// Status per student, roster order
    pub statuses: Vec<SubmissionStatus>,

    /// Files that matched no student, first-seen order, no duplicates
    pub unrecognised_files: Vec<String>,

    pub stats: ScanStats,
}

/// Scans a class's submission folder and matches files to students
#[derive(Debug)]
pub struct SubmissionScanner {
    /// Lists the submission folder
    file_collector: FileCollector,

    /// Decides which student a file belongs to
    strategy: Box<dyn MatchStrategy>,
}

impl Default for SubmissionScanner {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl SubmissionScanner {
    /// Create a new scanner with the given matching strategy
    pub fn new(strategy: Box<dyn MatchStrategy>) -> Self {
        Self {
            file_collector: FileCollector::new(),
            strategy,
        }
    }

    /// Create a new scanner using case-insensitive substring matching
    pub fn with_defaults() -> Self {
        Self::new(Box::new(SubstringMatch))
    }

    pub fn strategy(&self) -> &dyn MatchStrategy {
        self.strategy.as_ref()
    }

    /// Match every listed file against the roster
    pub fn resolve(&self, students: &[Student], listing: &DirectoryListing) -> MatchOutcome {
        let mut outcome = MatchOutcome {
            statuses: vec![SubmissionStatus::Missing; students.len()],
            ..MatchOutcome::default()
        };
        outcome.stats.total_files = listing.files.len();
        outcome.stats.skipped_files = listing.skipped.len();
        outcome.stats.skipped_file_paths = listing.skipped.clone();

        for file in &listing.files {
            let Some(index) = self.strategy.find_student(students, &file.file_name) else {
                debug!("No student matches {}", file.file_name);
                if !outcome.unrecognised_files.contains(&file.file_name) {
                    outcome.unrecognised_files.push(file.file_name.clone());
                }
                outcome.stats.unrecognised_files += 1;
                continue;
            };

            let student = &students[index].name;
            let Some(size) = file.size else {
                warn!("Skipping {} for {}: its size could not be read", file.file_name, student);
                outcome.stats.skipped_files += 1;
                outcome.stats.skipped_file_paths.push(file.path.clone());
                continue;
            };

            if let Some(previous) = outcome.statuses[index].file_name() {
                warn!(
                    "{} matches {} as well as {}; keeping the later file",
                    file.file_name, student, previous
                );
            }

            outcome.statuses[index] = if size == 0 {
                info!("Found {} for {} but it is empty", file.file_name, student);
                outcome.stats.empty_files += 1;
                SubmissionStatus::Empty(file.file_name.clone())
            } else {
                debug!("Found {} for {}", file.file_name, student);
                outcome.stats.matched_files += 1;
                SubmissionStatus::Found(file.file_name.clone())
            };
        }

        outcome
    }

    /// Run one scan cycle over `class`.
    ///
    /// The class is reset first, so files that have disappeared stop showing
    /// as found. If the submission folder is missing the class is left reset
    /// and `PathUnavailable` is returned.
    pub fn scan(&self, class: &mut Class) -> Result<ScanStats> {
        class.reset();

        let path = class.submission_path.clone();
        if !path.is_dir() {
            return Err(MonitorError::PathUnavailable {
                class: class.name.clone(),
                path,
            });
        }

        let listing = self.file_collector.collect_files(&path).map_err(|err| {
            debug!("Listing {} failed: {}", path.display(), err);
            MonitorError::PathUnavailable {
                class: class.name.clone(),
                path: path.clone(),
            }
        })?;

        let outcome = self.resolve(class.students(), &listing);
        Ok(Self::apply(class, outcome))
    }

    /// Write a resolved outcome into the class and recompute convergence
    fn apply(class: &mut Class, outcome: MatchOutcome) -> ScanStats {
        for (index, status) in outcome.statuses.into_iter().enumerate() {
            class.set_status(index, status);
        }
        for file_name in outcome.unrecognised_files {
            class.add_unrecognised_file(file_name);
        }
        class.check_convergence();

        debug!(
            "{}: {}/{} submitted, {} unrecognised files",
            class.name,
            class.found_count(),
            class.student_count(),
            class.unrecognised_files().len()
        );
        outcome.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::file_collector::SubmissionFile;
    use crate::submission::matcher::ExactTokenMatch;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn listing(files: &[(&str, Option<u64>)]) -> DirectoryListing {
        DirectoryListing {
            files: files
                .iter()
                .map(|(name, size)| SubmissionFile {
                    file_name: name.to_string(),
                    path: PathBuf::from("/submissions").join(name),
                    size: *size,
                })
                .collect(),
            skipped: Vec::new(),
        }
    }

    fn students(names: &[&str]) -> Vec<Student> {
        names.iter().map(|n| Student::new(*n)).collect()
    }

    #[test]
    fn test_resolve_found_empty_and_unrecognised() {
        let scanner = SubmissionScanner::with_defaults();
        let outcome = scanner.resolve(
            &students(&["alice", "bob", "carol"]),
            &listing(&[("alice_hw1.txt", Some(10)), ("bob.txt", Some(0)), ("zed.txt", Some(3))]),
        );

        assert_eq!(
            outcome.statuses,
            vec![
                SubmissionStatus::Found("alice_hw1.txt".to_string()),
                SubmissionStatus::Empty("bob.txt".to_string()),
                SubmissionStatus::Missing,
            ]
        );
        assert_eq!(outcome.unrecognised_files, vec!["zed.txt".to_string()]);
        assert_eq!(outcome.stats.matched_files, 1);
        assert_eq!(outcome.stats.empty_files, 1);
        assert_eq!(outcome.stats.unrecognised_files, 1);
    }

    #[test]
    fn test_resolve_later_file_overwrites() {
        let scanner = SubmissionScanner::with_defaults();
        let outcome = scanner.resolve(
            &students(&["alice"]),
            &listing(&[("alice_a.txt", Some(5)), ("alice_b.txt", Some(0))]),
        );
        assert_eq!(outcome.statuses, vec![SubmissionStatus::Empty("alice_b.txt".to_string())]);
    }

    #[test]
    fn test_resolve_with_exact_token_strategy() {
        let scanner = SubmissionScanner::new(Box::new(ExactTokenMatch));
        let outcome = scanner.resolve(
            &students(&["An", "Dan"]),
            &listing(&[("plan.txt", Some(4)), ("dan_hw.txt", Some(4))]),
        );
        assert_eq!(
            outcome.statuses,
            vec![
                SubmissionStatus::Missing,
                SubmissionStatus::Found("dan_hw.txt".to_string()),
            ]
        );
        assert_eq!(outcome.unrecognised_files, vec!["plan.txt".to_string()]);
    }

    #[test]
    fn test_resolve_unknown_size() {
        let scanner = SubmissionScanner::with_defaults();
        let outcome = scanner.resolve(
            &students(&["alice", "bob"]),
            &listing(&[("alice.txt", None), ("bob.txt", Some(3)), ("zed.txt", None)]),
        );

        assert_eq!(
            outcome.statuses,
            vec![
                SubmissionStatus::Missing,
                SubmissionStatus::Found("bob.txt".to_string()),
            ]
        );
        assert_eq!(outcome.unrecognised_files, vec!["zed.txt".to_string()]);
        assert_eq!(outcome.stats.skipped_files, 1);
        assert_eq!(outcome.stats.skipped_file_paths, vec![PathBuf::from("/submissions/alice.txt")]);
    }

    #[test]
    fn test_scan_missing_path_resets_and_fails() {
        let mut class = Class::new("Maths", "/no/such/submission/dir");
        class.add_student("alice");
        class.set_status(0, SubmissionStatus::Found("alice.txt".to_string()));
        class.add_unrecognised_file("x.txt");

        let err = SubmissionScanner::with_defaults().scan(&mut class).unwrap_err();

        assert!(matches!(err, MonitorError::PathUnavailable { .. }));
        assert!(class.students()[0].status.is_missing());
        assert!(class.unrecognised_files().is_empty());
        assert!(!class.all_submitted());
    }
}
