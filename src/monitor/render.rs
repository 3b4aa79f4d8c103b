use std::fmt;
use std::path::Path;

use anyhow::Result;
use log::trace;

use crate::roster::{Class, SubmissionStatus};
use crate::utils::file_utils;

const STYLE: &str = "#error { color: red; }\n#found { color: green; }";

/// Escape text for inclusion in HTML element content or attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// One rendering of the status page
struct StatusPage<'a> {
    class: &'a Class,
    notice: Option<&'a str>,
    refresh_secs: u64,
}

impl StatusPage<'_> {
    fn status_cell(status: &SubmissionStatus) -> String {
        match status {
            SubmissionStatus::Missing => r#"<span id="error">Missing</span>"#.to_string(),
            SubmissionStatus::Found(file) => {
                format!(r#"<span id="found">{}</span>"#, escape_html(file))
            }
            SubmissionStatus::Empty(file) => format!(
                r#"<span id="error">Empty file - copy again</span> ({})"#,
                escape_html(file)
            ),
        }
    }
}

impl fmt::Display for StatusPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = self.class;
        let name = escape_html(&class.name);

        writeln!(f, "<html><head>")?;
        writeln!(f, "<title>{}</title>", name)?;
        writeln!(f, r#"<meta http-equiv="refresh" content="{}">"#, self.refresh_secs)?;
        writeln!(f, "<style>\n{}\n</style>", STYLE)?;
        writeln!(f, "</head>\n<body>")?;
        writeln!(f, "<h1>Submissions for {}</h1>", name)?;
        writeln!(
            f,
            "<h2>Submit to {}</h2>",
            escape_html(&class.submission_path.display().to_string())
        )?;
        writeln!(f, "<p>{} of {} submitted</p>", class.found_count(), class.student_count())?;

        if let Some(notice) = self.notice {
            writeln!(f, r#"<p id="error">{}</p>"#, escape_html(notice))?;
        }

        writeln!(f, "<table>")?;
        writeln!(f, "<tr><th>Student name</th><th>Submission status</th></tr>")?;
        for student in class.students() {
            writeln!(
                f,
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(&student.name),
                Self::status_cell(&student.status)
            )?;
        }
        writeln!(f, "</table>")?;

        if !class.unrecognised_files().is_empty() {
            writeln!(f, "<h2>Unrecognised files</h2>\n<ul>")?;
            for file in class.unrecognised_files() {
                writeln!(f, "<li>{}</li>", escape_html(file))?;
            }
            writeln!(f, "</ul>")?;
        }

        writeln!(f, "</body></html>")
    }
}

/// Renders the auto-refreshing status page for a class
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    /// Seconds between browser refreshes
    refresh_secs: u64,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new(10)
    }
}

impl HtmlRenderer {
    pub fn new(refresh_secs: u64) -> Self {
        Self { refresh_secs }
    }

    /// Build the page for the current state of `class`
    pub fn render(&self, class: &Class) -> String {
        self.render_with_notice(class, None)
    }

    /// Build the page, with an optional warning shown above the table
    pub fn render_with_notice(&self, class: &Class, notice: Option<&str>) -> String {
        StatusPage {
            class,
            notice,
            refresh_secs: self.refresh_secs,
        }
        .to_string()
    }

    /// Render `class` and write the page to `path`
    pub fn write(&self, class: &Class, notice: Option<&str>, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        trace!("Writing status page for {} to {}", class.name, path.display());
        file_utils::write_string_to_file(path, &self.render_with_notice(class, notice))
    }
}

/// One-line summary of a class, for the console
pub fn console_summary(class: &Class) -> String {
    let mut summary = format!(
        "{}: {}/{} submitted",
        class.name,
        class.found_count(),
        class.student_count()
    );

    let empty: Vec<&str> = class
        .students()
        .iter()
        .filter(|s| matches!(s.status, SubmissionStatus::Empty(_)))
        .map(|s| s.name.as_str())
        .collect();
    if !empty.is_empty() {
        summary.push_str(&format!(", empty: {}", empty.join(", ")));
    }

    if !class.unrecognised_files().is_empty() {
        summary.push_str(&format!(", {} unrecognised", class.unrecognised_files().len()));
    }
    summary
}
