use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use pretty_assertions::assert_eq;
use tempfile::{TempDir, tempdir};

use crate::error::MonitorError;
use crate::roster::{Class, RosterParser, SubmissionStatus};
use crate::submission::{MatchMode, SubmissionScanner};

// Helper function to create a submission folder with the given files
fn create_submission_dir(files: &[(&str, &str)]) -> Result<(TempDir, PathBuf)> {
    let temp_dir = tempdir()?;
    let submissions = temp_dir.path().join("submissions");
    fs::create_dir_all(&submissions)?;
    for (name, content) in files {
        fs::write(submissions.join(name), content)?;
    }
    Ok((temp_dir, submissions))
}

// Helper function to build a class from a roster written for `path`
fn class_for(path: &Path, students: &[&str]) -> Result<Class> {
    let mut roster = format!("Class Test\nPath {}\n", path.display());
    for student in students {
        roster.push_str(student);
        roster.push('\n');
    }
    roster.push_str("END\n");

    let mut classes = RosterParser::new().parse(&roster)?;
    Ok(classes.remove(0))
}

#[test]
fn test_roster_to_scan() -> Result<()> {
    let (_temp_dir, submissions) = create_submission_dir(&[
        ("alice_hw1.txt", "0123456789"),
        ("bob.txt", ""),
        ("unknown_person.txt", "?"),
    ])?;
    let mut class = class_for(&submissions, &["alice", "bob", "carol"])?;

    let stats = SubmissionScanner::with_defaults().scan(&mut class)?;

    let statuses: Vec<(&str, SubmissionStatus)> = class
        .students()
        .iter()
        .map(|s| (s.name.as_str(), s.status.clone()))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("alice", SubmissionStatus::Found("alice_hw1.txt".to_string())),
            ("bob", SubmissionStatus::Empty("bob.txt".to_string())),
            ("carol", SubmissionStatus::Missing),
        ]
    );
    assert_eq!(class.unrecognised_files(), &["unknown_person.txt".to_string()]);
    assert_eq!(class.found_count(), 2);
    assert!(!class.all_submitted());
    assert_eq!(stats.total_files, 3);
    Ok(())
}

#[test]
fn test_directories_are_not_submissions() -> Result<()> {
    let (_temp_dir, submissions) = create_submission_dir(&[])?;
    fs::create_dir(submissions.join("alice_folder"))?;
    fs::write(submissions.join("alice_folder").join("alice.txt"), "nested")?;
    let mut class = class_for(&submissions, &["alice"])?;

    SubmissionScanner::with_defaults().scan(&mut class)?;

    assert!(class.students()[0].status.is_missing());
    assert!(class.unrecognised_files().is_empty());
    Ok(())
}

#[test]
fn test_removed_folder_surfaces_path_unavailable() -> Result<()> {
    let (_temp_dir, submissions) = create_submission_dir(&[("alice.txt", "work")])?;
    let mut class = class_for(&submissions, &["alice"])?;
    let scanner = SubmissionScanner::with_defaults();

    scanner.scan(&mut class)?;
    assert!(class.all_submitted());

    fs::remove_dir_all(&submissions)?;
    let err = scanner.scan(&mut class).unwrap_err();

    assert!(matches!(err, MonitorError::PathUnavailable { ref class, .. } if class == "Test"));
    assert!(err.is_transient());
    assert!(!class.all_submitted());
    Ok(())
}

#[test]
fn test_folder_reappearing_is_scanned_again() -> Result<()> {
    let (_temp_dir, submissions) = create_submission_dir(&[])?;
    let mut class = class_for(&submissions, &["alice"])?;
    let scanner = SubmissionScanner::with_defaults();

    fs::remove_dir(&submissions)?;
    assert!(scanner.scan(&mut class).is_err());

    fs::create_dir(&submissions)?;
    fs::write(submissions.join("Alice.docx"), "essay")?;
    scanner.scan(&mut class)?;

    assert_eq!(class.students()[0].status, SubmissionStatus::Found("Alice.docx".to_string()));
    Ok(())
}

#[test]
fn test_regex_mode_from_config() -> Result<()> {
    let (_temp_dir, submissions) = create_submission_dir(&[
        ("ann_hw1.pdf", "x"),
        ("joanna_hw1.pdf", "x"),
    ])?;
    let mut class = class_for(&submissions, &["Ann", "Joanna"])?;
    let mode = MatchMode::Regex {
        pattern: r"^{name}_hw\d+\.pdf$".to_string(),
    };

    SubmissionScanner::new(mode.build()?).scan(&mut class)?;

    assert_eq!(class.students()[0].status, SubmissionStatus::Found("ann_hw1.pdf".to_string()));
    assert_eq!(class.students()[1].status, SubmissionStatus::Found("joanna_hw1.pdf".to_string()));
    assert!(class.all_submitted());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_unreadable_entry_is_skipped() -> Result<()> {
    let (_temp_dir, submissions) = create_submission_dir(&[("bob.txt", "work")])?;
    std::os::unix::fs::symlink(submissions.join("deleted.txt"), submissions.join("alice_link.txt"))?;
    let mut class = class_for(&submissions, &["alice", "bob"])?;

    let stats = SubmissionScanner::with_defaults().scan(&mut class)?;

    assert_eq!(stats.skipped_files, 1);
    assert_eq!(stats.skipped_file_paths, vec![submissions.join("alice_link.txt")]);
    assert_eq!(stats.total_files, 1);
    assert_eq!(class.students()[0].status, SubmissionStatus::Missing);
    assert_eq!(class.students()[1].status, SubmissionStatus::Found("bob.txt".to_string()));
    assert!(class.unrecognised_files().is_empty());
    Ok(())
}

#[test]
fn test_class_without_path_is_unavailable() -> Result<()> {
    let mut classes = RosterParser::new().parse("Class Drama\nEND\n")?;
    let mut class = classes.remove(0);

    let err = SubmissionScanner::with_defaults().scan(&mut class).unwrap_err();

    assert!(matches!(err, MonitorError::PathUnavailable { ref class, .. } if class == "Drama"));
    Ok(())
}
