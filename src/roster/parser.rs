use std::fs;
use std::path::Path;

use log::{debug, trace, warn};

use crate::error::{MonitorError, Result, RosterViolation};
use super::types::Class;

const CLASS_MARKER: &str = "Class";
const PATH_MARKER: &str = "Path";
const END_MARKER: &str = "END";

/// Where the parser is within a class definition block
#[derive(Debug, Default)]
enum BlockState {
    /// Between blocks; the next marker must be `Class`
    #[default]
    Closed,

    /// `Class` seen, waiting for `Path`
    Named(Class),

    /// `Class` and `Path` seen; student lines are accepted
    Open(Class),
}

/// Parser state threaded through the lines of one roster
#[derive(Debug, Default)]
struct ParserState {
    block: BlockState,
    classes: Vec<Class>,
}

/// A single roster line, classified
#[derive(Debug, PartialEq, Eq)]
enum RosterLine<'a> {
    Blank,
    ClassName(&'a str),
    Path(&'a str),
    End,
    Student(&'a str),
}

impl<'a> RosterLine<'a> {
    fn classify(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            RosterLine::Blank
        } else if let Some(name) = marker_value(line, CLASS_MARKER) {
            RosterLine::ClassName(name)
        } else if let Some(path) = marker_value(line, PATH_MARKER) {
            RosterLine::Path(path)
        } else if line.starts_with(END_MARKER) {
            RosterLine::End
        } else {
            RosterLine::Student(line)
        }
    }
}

/// Value after a marker word. The marker must be followed by whitespace and a
/// value, so "Classen" or a bare "Path" line is a student.
fn marker_value<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(marker)?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

impl ParserState {
    fn violation(line: usize, content: &str, violation: RosterViolation) -> MonitorError {
        MonitorError::MalformedRoster {
            line,
            content: content.to_string(),
            violation,
        }
    }

    /// Finish the current block, if any, and push its class
    fn close_block(&mut self, line: usize) {
        match std::mem::take(&mut self.block) {
            BlockState::Closed => {
                debug!("Terminator at line {} with no open class", line);
            }
            BlockState::Named(class) => {
                warn!("Class {} has no submission path; scans will report it unavailable", class.name);
                self.classes.push(class);
            }
            BlockState::Open(class) => {
                debug!("End of class {} found ({} students)", class.name, class.student_count());
                self.classes.push(class);
            }
        }
    }

    fn feed(&mut self, line_no: usize, raw: &str) -> Result<()> {
        let content = raw.trim();
        match RosterLine::classify(raw) {
            RosterLine::Blank => Ok(()),
            RosterLine::ClassName(name) => {
                if !matches!(self.block, BlockState::Closed) {
                    return Err(Self::violation(line_no, content, RosterViolation::ClassAlreadyNamed));
                }
                trace!("Class {} declared at line {}", name, line_no);
                self.block = BlockState::Named(Class::new(name, ""));
                Ok(())
            }
            RosterLine::Path(path) => match std::mem::take(&mut self.block) {
                BlockState::Closed => {
                    Err(Self::violation(line_no, content, RosterViolation::PathBeforeName))
                }
                BlockState::Open(class) => {
                    self.block = BlockState::Open(class);
                    Err(Self::violation(line_no, content, RosterViolation::DuplicatePath))
                }
                BlockState::Named(mut class) => {
                    class.submission_path = path.into();
                    self.block = BlockState::Open(class);
                    Ok(())
                }
            },
            RosterLine::End => {
                self.close_block(line_no);
                Ok(())
            }
            RosterLine::Student(name) => match &mut self.block {
                BlockState::Open(class) => {
                    if class.student(name).is_some() {
                        warn!("Student {} listed twice in class {}", name, class.name);
                    }
                    class.add_student(name);
                    Ok(())
                }
                _ => Err(Self::violation(line_no, content, RosterViolation::StudentBeforeDeclared)),
            },
        }
    }

    fn finish(mut self, last_line: usize) -> Vec<Class> {
        // A trailing block without a terminator is accepted
        if !matches!(self.block, BlockState::Closed) {
            debug!("Roster ended with an open class block");
            self.close_block(last_line);
        }
        self.classes
    }
}

/// Parser for roster definitions
#[derive(Debug, Default)]
pub struct RosterParser;

impl RosterParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse roster text into classes, in file order
    pub fn parse(&self, content: &str) -> Result<Vec<Class>> {
        let mut state = ParserState::default();
        let mut last_line = 0;

        for (index, line) in content.lines().enumerate() {
            last_line = index + 1;
            state.feed(last_line, line)?;
        }

        let classes = state.finish(last_line);
        debug!("Parsed {} classes from roster", classes.len());
        Ok(classes)
    }

    /// Read and parse a roster file
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Vec<Class>> {
        let path = path.as_ref();
        debug!("Reading roster from {}", path.display());

        let content = fs::read_to_string(path).map_err(|source| MonitorError::RosterUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

        self.parse(&content)
    }
}
