use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Submission state of a single student for the current scan cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "file")]
pub enum SubmissionStatus {
    /// No file matched the student
    #[default]
    Missing,

    /// A non-empty file matched the student
    Found(String),

    /// A zero-byte file matched the student; it needs copying again
    Empty(String),
}

impl SubmissionStatus {
    pub fn is_missing(&self) -> bool {
        matches!(self, SubmissionStatus::Missing)
    }

    /// File name behind the status, if any
    pub fn file_name(&self) -> Option<&str> {
        match self {
            SubmissionStatus::Missing => None,
            SubmissionStatus::Found(file) | SubmissionStatus::Empty(file) => Some(file),
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionStatus::Missing => write!(f, "Missing"),
            SubmissionStatus::Found(file) => write!(f, "{}", file),
            SubmissionStatus::Empty(file) => write!(f, "Empty file - copy again ({})", file),
        }
    }
}

/// A student listed on a class roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Name as written in the roster
    pub name: String,

    /// Status from the most recent scan
    pub status: SubmissionStatus,
}

impl Student {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: SubmissionStatus::Missing,
        }
    }
}

/// A class being monitored, built from one roster definition block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    /// Name of the class
    pub name: String,

    /// Directory students copy their work into
    pub submission_path: PathBuf,

    /// Students in roster order
    students: Vec<Student>,

    /// Files from the last scan that matched no student, in first-seen order
    unrecognised_files: Vec<String>,

    /// Number of students whose status is not `Missing`
    found_count: usize,

    /// Set once every student has a non-missing status
    all_submitted: bool,
}

impl Class {
    /// Create a new class with no students
    pub fn new(name: impl Into<String>, submission_path: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            submission_path: submission_path.as_ref().to_path_buf(),
            students: Vec::new(),
            unrecognised_files: Vec::new(),
            found_count: 0,
            all_submitted: false,
        }
    }

    pub fn add_student(&mut self, name: impl Into<String>) {
        self.students.push(Student::new(name));
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// Look up a student by exact name
    pub fn student(&self, name: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.name == name)
    }

    pub fn unrecognised_files(&self) -> &[String] {
        &self.unrecognised_files
    }

    /// Record a file that matched nobody. Names already recorded are ignored.
    pub fn add_unrecognised_file(&mut self, file_name: impl Into<String>) {
        let file_name = file_name.into();
        if !self.unrecognised_files.contains(&file_name) {
            self.unrecognised_files.push(file_name);
        }
    }

    pub fn found_count(&self) -> usize {
        self.found_count
    }

    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    pub fn all_submitted(&self) -> bool {
        self.all_submitted
    }

    /// Clear everything a scan cycle produces
    pub fn reset(&mut self) {
        self.unrecognised_files.clear();
        for student in &mut self.students {
            student.status = SubmissionStatus::Missing;
        }
        self.found_count = 0;
        self.all_submitted = false;
    }

    /// Set the status of the student at `index` (roster order)
    pub fn set_status(&mut self, index: usize, status: SubmissionStatus) {
        if let Some(student) = self.students.get_mut(index) {
            student.status = status;
        }
    }

    /// Recompute the found count and whether everyone has submitted
    pub fn check_convergence(&mut self) -> bool {
        self.found_count = self.students.iter().filter(|s| !s.status.is_missing()).count();
        self.all_submitted = self.found_count == self.students.len();
        self.all_submitted
    }

    /// Capture the current statuses as an immutable record
    pub fn snapshot(&self) -> ClassSnapshot {
        ClassSnapshot {
            class_name: self.name.clone(),
            taken_at: Utc::now(),
            statuses: self
                .students
                .iter()
                .map(|s| (s.name.clone(), s.status.clone()))
                .collect(),
            unrecognised_files: self.unrecognised_files.clone(),
            found_count: self.found_count,
            all_submitted: self.all_submitted,
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Class {}", self.name)
    }
}

/// Statuses of a class at the end of one scan cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSnapshot {
    pub class_name: String,

    pub taken_at: DateTime<Utc>,

    /// Student name and status, roster order
    pub statuses: Vec<(String, SubmissionStatus)>,

    pub unrecognised_files: Vec<String>,

    pub found_count: usize,

    pub all_submitted: bool,
}

/// One student whose status differs between two snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub student: String,
    pub before: SubmissionStatus,
    pub after: SubmissionStatus,
}

impl fmt::Display for StatusChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.student, self.before, self.after)
    }
}

impl ClassSnapshot {
    /// Status changes since `previous`. Students are paired by roster position;
    /// a student absent from `previous` is compared against `Missing`.
    pub fn diff(&self, previous: &ClassSnapshot) -> Vec<StatusChange> {
        self.statuses
            .iter()
            .enumerate()
            .filter_map(|(index, (name, after))| {
                let before = previous
                    .statuses
                    .get(index)
                    .filter(|(prev_name, _)| prev_name == name)
                    .map(|(_, status)| status.clone())
                    .unwrap_or_default();
                (before != *after).then(|| StatusChange {
                    student: name.clone(),
                    before,
                    after: after.clone(),
                })
            })
            .collect()
    }

    /// Unrecognised files that were not present in `previous`
    pub fn new_unrecognised_files<'a>(&'a self, previous: &ClassSnapshot) -> Vec<&'a str> {
        self.unrecognised_files
            .iter()
            .filter(|f| !previous.unrecognised_files.contains(f))
            .map(String::as_str)
            .collect()
    }
}
