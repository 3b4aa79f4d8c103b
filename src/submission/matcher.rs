use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};
use crate::roster::Student;

/// Placeholder replaced by the escaped student name in regex templates
pub const NAME_PLACEHOLDER: &str = "{name}";

static TOKEN_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^[:alnum:]]+").unwrap());

/// Decides which student, if any, a submitted file belongs to
pub trait MatchStrategy: Debug + Send + Sync {
    /// Whether `file_name` belongs to the student called `student`
    fn matches(&self, student: &str, file_name: &str) -> bool;

    /// Index of the first student in roster order that matches `file_name`
    fn find_student(&self, students: &[Student], file_name: &str) -> Option<usize> {
        students.iter().position(|s| self.matches(&s.name, file_name))
    }
}

/// Case-insensitive substring match. A student named "An" matches any file
/// containing "an"; the first such student in the roster wins.
#[derive(Debug, Default, Clone)]
pub struct SubstringMatch;

impl MatchStrategy for SubstringMatch {
    fn matches(&self, student: &str, file_name: &str) -> bool {
        file_name.to_lowercase().contains(&student.to_lowercase())
    }
}

/// Matches when the student's name tokens appear as a contiguous run of the
/// file name's tokens. Tokens are lowercase alphanumeric runs.
#[derive(Debug, Default, Clone)]
pub struct ExactTokenMatch;

fn tokens(text: &str) -> Vec<String> {
    TOKEN_SPLIT
        .split(&text.to_lowercase())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

impl MatchStrategy for ExactTokenMatch {
    fn matches(&self, student: &str, file_name: &str) -> bool {
        let wanted = tokens(student);
        if wanted.is_empty() {
            return false;
        }
        tokens(file_name)
            .windows(wanted.len())
            .any(|window| window == wanted.as_slice())
    }
}

/// Matches file names against a template such as `^{name}_hw\d+`, with the
/// student name regex-escaped and the whole pattern case-insensitive.
#[derive(Debug)]
pub struct RegexMatch {
    template: String,

    /// Expanded pattern per student name; `None` when it failed to compile
    compiled: Mutex<HashMap<String, Option<Regex>>>,
}

impl RegexMatch {
    /// Create a regex strategy, checking that the template compiles
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        Self::compile(&template, "student")?;
        Ok(Self {
            template,
            compiled: Mutex::new(HashMap::new()),
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    fn compile(template: &str, student: &str) -> Result<Regex> {
        let pattern = template.replace(NAME_PLACEHOLDER, &regex::escape(student));
        RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| MonitorError::InvalidPattern { pattern, source })
    }
}

impl MatchStrategy for RegexMatch {
    fn matches(&self, student: &str, file_name: &str) -> bool {
        let mut compiled = self.compiled.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(regex) = compiled.get(student) {
            return regex.as_ref().is_some_and(|re| re.is_match(file_name));
        }

        debug!("Compiling pattern for {}", student);
        let regex = Self::compile(&self.template, student)
            .map_err(|err| warn!("Pattern for {} failed to compile: {}", student, err))
            .ok();
        let matched = regex.as_ref().is_some_and(|re| re.is_match(file_name));
        compiled.insert(student.to_string(), regex);
        matched
    }
}

/// Matching strategy selection, as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case", tag = "mode")]
pub enum MatchMode {
    #[default]
    Substring,
    ExactToken,
    Regex { pattern: String },
}

impl MatchMode {
    /// Build the strategy for this mode
    pub fn build(&self) -> Result<Box<dyn MatchStrategy>> {
        Ok(match self {
            MatchMode::Substring => Box::new(SubstringMatch),
            MatchMode::ExactToken => Box::new(ExactTokenMatch),
            MatchMode::Regex { pattern } => Box::new(RegexMatch::new(pattern.clone())?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn roster(names: &[&str]) -> Vec<Student> {
        names.iter().map(|n| Student::new(*n)).collect()
    }

    #[test_case("Al", "al_report.PDF", true ; "case insensitive")]
    #[test_case("alice", "ALICE_hw1.txt", true ; "upper file name")]
    #[test_case("An", "plan.txt", true ; "substring inside word")]
    #[test_case("bob", "alice.txt", false ; "no match")]
    #[test_case("Mary Jane", "mary jane essay.docx", true ; "name with space")]
    fn test_substring(student: &str, file: &str, expected: bool) {
        assert_eq!(SubstringMatch.matches(student, file), expected);
    }

    #[test_case("An", "plan.txt", false ; "no match inside word")]
    #[test_case("An", "an_hw1.txt", true ; "token match")]
    #[test_case("Mary Jane", "Mary-Jane_essay.docx", true ; "multi token run")]
    #[test_case("Mary Jane", "jane_mary.docx", false ; "tokens out of order")]
    #[test_case("O'Neil", "o_neil.txt", true ; "punctuation in name")]
    fn test_exact_token(student: &str, file: &str, expected: bool) {
        assert_eq!(ExactTokenMatch.matches(student, file), expected);
    }

    #[test]
    fn test_regex_template() {
        let strategy = RegexMatch::new(r"^{name}_hw\d+").unwrap();
        assert!(strategy.matches("alice", "Alice_hw2.pdf"));
        assert!(!strategy.matches("alice", "malice_hw2.pdf"));
        assert!(!strategy.matches("alice", "alice_notes.pdf"));
    }

    #[test]
    fn test_regex_escapes_name() {
        let strategy = RegexMatch::new(r"^{name}\.txt$").unwrap();
        assert!(strategy.matches("a.b", "a.b.txt"));
        assert!(!strategy.matches("a.b", "axb.txt"));
    }

    #[test]
    fn test_regex_compiled_once_per_student() {
        let strategy = RegexMatch::new(r"^{name}_").unwrap();
        let students = roster(&["ann", "bob"]);

        assert_eq!(strategy.find_student(&students, "bob_hw1.txt"), Some(1));
        assert_eq!(strategy.find_student(&students, "ann_hw1.txt"), Some(0));
        assert_eq!(strategy.find_student(&students, "carol_hw1.txt"), None);
        assert_eq!(strategy.compiled.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_regex_template() {
        let err = RegexMatch::new("({name}").unwrap_err();
        assert!(matches!(err, MonitorError::InvalidPattern { .. }));
    }

    #[test]
    fn test_first_student_in_roster_wins() {
        let students = roster(&["Ann", "Anna", "bob"]);
        assert_eq!(SubstringMatch.find_student(&students, "anna_hw.txt"), Some(0));
        assert_eq!(ExactTokenMatch.find_student(&students, "anna_hw.txt"), Some(1));
        assert_eq!(SubstringMatch.find_student(&students, "carol.txt"), None);
    }

    #[test]
    fn test_match_mode_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            matching: MatchMode,
        }
        let parsed: Wrapper = toml::from_str("[matching]\nmode = \"regex\"\npattern = \"^{name}\"").unwrap();
        assert_eq!(parsed.matching, MatchMode::Regex { pattern: "^{name}".to_string() });

        let parsed: Wrapper = toml::from_str("[matching]\nmode = \"exact-token\"").unwrap();
        assert_eq!(parsed.matching, MatchMode::ExactToken);
    }
}
